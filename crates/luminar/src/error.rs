use thiserror::Error;

/// Invalid flag schema.
///
/// These are configuration mistakes: the schema is rejected as a whole
/// before any argv element is read.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("flag name cannot be empty")]
    EmptyName,

    #[error("flag name {name:?} must be longer than a character (single characters are reserved for aliases)")]
    SingleCharacterName { name: String },

    #[error("flag name {name:?} cannot contain {character:?}")]
    ReservedCharacter { name: String, character: char },

    #[error("duplicate flags named {name:?}")]
    DuplicateName { name: String },

    #[error("flag alias for flag {flag:?} cannot be empty")]
    EmptyAlias { flag: String },

    #[error("flag alias {alias:?} for flag {flag:?} must be a single character")]
    MultiCharacterAlias { alias: String, flag: String },

    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}
