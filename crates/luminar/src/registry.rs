//! Name lookup table built from a [`Schema`].
//!
//! Each declared flag is reachable by its name, its kebab-case form and its
//! alias. All of them share one value slot.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::schema::{FlagSchema, FlagValue, Schema};
use crate::token::is_word_char;

/// Convert `camelCase` to `kebab-case`.
///
/// An uppercase ASCII letter preceded by a word character gets a `-` in
/// front of it; the whole name is then lowercased.
pub fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(is_word_char) {
            out.push('-');
        }
        out.push(c);
        prev = Some(c);
    }
    out.to_lowercase()
}

fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ':' | '=')
}

fn validate_flag_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::EmptyName);
    }

    if name.chars().count() == 1 {
        return Err(SchemaError::SingleCharacterName {
            name: name.to_string(),
        });
    }

    if let Some(character) = name.chars().find(|c| is_reserved(*c)) {
        return Err(SchemaError::ReservedCharacter {
            name: name.to_string(),
            character,
        });
    }

    Ok(())
}

#[derive(Debug)]
pub(crate) struct Slot<'s> {
    pub(crate) name: &'s str,
    pub(crate) schema: &'s FlagSchema,
    pub(crate) values: Vec<FlagValue>,
}

#[derive(Debug)]
pub(crate) struct Registry<'s> {
    slots: Vec<Slot<'s>>,
    names: HashMap<String, usize>,
}

impl<'s> Registry<'s> {
    /// Validate `schema` and index every name, kebab-case form and alias.
    pub(crate) fn new(schema: &'s Schema) -> Result<Self, SchemaError> {
        let mut registry = Self {
            slots: Vec::with_capacity(schema.len()),
            names: HashMap::new(),
        };

        for (name, flag) in schema.iter() {
            validate_flag_name(name)?;

            let slot = registry.slots.len();
            registry.slots.push(Slot {
                name,
                schema: flag,
                values: Vec::new(),
            });
            registry.register(name.to_string(), slot)?;

            let kebab = camel_to_kebab(name);
            if kebab != name {
                registry.register(kebab, slot)?;
            }

            if let Some(alias) = &flag.alias {
                match alias.chars().count() {
                    0 => {
                        return Err(SchemaError::EmptyAlias {
                            flag: name.to_string(),
                        });
                    }
                    1 => registry.register(alias.clone(), slot)?,
                    _ => {
                        return Err(SchemaError::MultiCharacterAlias {
                            alias: alias.clone(),
                            flag: name.to_string(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            flags = registry.slots.len(),
            names = registry.names.len(),
            "flag registry created"
        );
        Ok(registry)
    }

    fn register(&mut self, name: String, slot: usize) -> Result<(), SchemaError> {
        if self.names.contains_key(&name) {
            return Err(SchemaError::DuplicateName { name });
        }
        self.names.insert(name, slot);
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub(crate) fn slot(&self, slot: usize) -> &Slot<'s> {
        &self.slots[slot]
    }

    pub(crate) fn push(&mut self, slot: usize, value: FlagValue) {
        self.slots[slot].values.push(value);
    }

    /// Collapse collected values into one entry per declared flag, in
    /// declaration order.
    ///
    /// A flag with no values takes its default when it has one. Otherwise a
    /// multi-value flag yields its (possibly empty) list and a single-value
    /// flag its last value.
    pub(crate) fn finalize(self) -> IndexMap<String, Option<FlagValue>> {
        self.slots
            .into_iter()
            .map(|slot| {
                let value = match &slot.schema.default {
                    Some(default) if slot.values.is_empty() => default.resolve(),
                    _ if slot.schema.multiple => Some(FlagValue::List(slot.values)),
                    _ => slot.values.into_iter().last(),
                };
                (slot.name.to_string(), value)
            })
            .collect()
    }
}
