//! Flag schemas and parsed flag values.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SchemaError;

/// A parsed flag value.
///
/// Serializes without a tag, so a list of numbers is a plain JSON array.
/// `NaN` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<FlagValue>),
    Json(serde_json::Value),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FlagValue]> {
        match self {
            Self::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<FlagValue>> From<Vec<T>> for FlagValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for FlagValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            other => Self::Json(other),
        }
    }
}

type ParseFn = dyn Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync;

/// A named, user-supplied value parser.
#[derive(Clone)]
pub struct Parser {
    name: String,
    parse: Arc<ParseFn>,
}

impl Parser {
    pub fn new<F>(name: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parse: Arc::new(parse),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parse(&self, value: &str) -> anyhow::Result<FlagValue> {
        (self.parse)(value)
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parser").field(&self.name).finish()
    }
}

/// How a flag's raw string value becomes a [`FlagValue`].
#[derive(Debug, Clone)]
pub enum FlagType {
    /// The raw string, unchanged.
    String,
    /// Decimal or exponent notation, `Infinity`, or an unsigned `0x` / `0o` /
    /// `0b` integer, with surrounding whitespace ignored. A blank value is
    /// `0`, an empty one or anything unparsable is `NaN`.
    Number,
    /// Never takes the following token as its value. Bare flag is `true`;
    /// an inline value is `true` unless it is exactly `false`.
    Boolean,
    Custom(Parser),
}

impl FlagType {
    pub fn custom<F>(name: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync + 'static,
    {
        Self::Custom(Parser::new(name, parse))
    }

    /// The value a flag occurrence resolves to without looking at the next
    /// token, or `None` when it should wait for one.
    pub(crate) fn immediate<'v>(&self, value: Option<&'v str>) -> Option<Immediate<'v>> {
        match self {
            Self::Boolean => Some(Immediate::Bool(value != Some("false"))),
            _ => value.map(Immediate::Raw),
        }
    }

    /// Convert a raw string. A missing value arrives here as `""`.
    pub(crate) fn apply(&self, value: &str) -> anyhow::Result<FlagValue> {
        match self {
            Self::String => Ok(FlagValue::String(value.to_string())),
            Self::Number => Ok(FlagValue::Number(parse_number(value))),
            Self::Boolean => Ok(FlagValue::Bool(value != "false")),
            Self::Custom(parser) => parser.parse(value),
        }
    }

    pub(crate) fn resolve(&self, value: Immediate<'_>) -> anyhow::Result<FlagValue> {
        match value {
            Immediate::Bool(b) => Ok(FlagValue::Bool(b)),
            Immediate::Raw(raw) => self.apply(raw),
        }
    }
}

fn parse_number(value: &str) -> f64 {
    if value.is_empty() {
        return f64::NAN;
    }

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let Some(digits) = trimmed
            .get(..2)
            .filter(|p| p.eq_ignore_ascii_case(prefix))
            .map(|_| &trimmed[2..])
        else {
            continue;
        };
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0, |acc: f64, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN);
    }

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    // `f64::from_str` also takes `inf`, `infinity` and `nan` in any case
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// A flag value known at the flag token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Immediate<'v> {
    Bool(bool),
    Raw(&'v str),
}

/// Value used when a flag never appears in argv.
#[derive(Clone)]
pub enum FlagDefault {
    Value(FlagValue),
    /// Evaluated once per parse, only when the default is needed.
    Lazy(Arc<dyn Fn() -> FlagValue + Send + Sync>),
    /// An explicit "no value" default. Multi-value flags end up unset
    /// instead of an empty list.
    Unset,
}

impl FlagDefault {
    pub(crate) fn resolve(&self) -> Option<FlagValue> {
        match self {
            Self::Value(value) => Some(value.clone()),
            Self::Lazy(f) => Some(f()),
            Self::Unset => None,
        }
    }
}

impl fmt::Debug for FlagDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
            Self::Unset => f.write_str("Unset"),
        }
    }
}

/// Declaration of one flag.
#[derive(Debug, Clone)]
pub struct FlagSchema {
    pub kind: FlagType,
    /// Collect every occurrence into a list instead of keeping the last one.
    pub multiple: bool,
    /// Single-character alias, usable as `-x` and inside clusters.
    pub alias: Option<String>,
    pub default: Option<FlagDefault>,
}

impl FlagSchema {
    pub fn new(kind: FlagType) -> Self {
        Self {
            kind,
            multiple: false,
            alias: None,
            default: None,
        }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn default(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(FlagDefault::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> FlagValue + Send + Sync + 'static,
    {
        self.default = Some(FlagDefault::Lazy(Arc::new(f)));
        self
    }

    pub fn default_unset(mut self) -> Self {
        self.default = Some(FlagDefault::Unset);
        self
    }
}

impl From<FlagType> for FlagSchema {
    fn from(kind: FlagType) -> Self {
        Self::new(kind)
    }
}

/// Ordered set of flag declarations. Parsed results keep this order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    flags: IndexMap<String, FlagSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a flag. Redeclaring a name replaces the earlier declaration.
    pub fn flag(mut self, name: impl Into<String>, schema: impl Into<FlagSchema>) -> Self {
        self.insert(name, schema);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: impl Into<FlagSchema>) {
        self.flags.insert(name.into(), schema.into());
    }

    pub fn get(&self, name: &str) -> Option<&FlagSchema> {
        self.flags.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagSchema)> {
        self.flags.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Build a schema from its JSON form.
    ///
    /// ```json
    /// {
    ///   "verbose": { "type": ["boolean"], "alias": "v" },
    ///   "size": "number",
    ///   "tag": ["string"],
    ///   "format": { "type": "string", "default": "plain" }
    /// }
    /// ```
    ///
    /// `"default": null` declares an explicit unset default.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let specs: IndexMap<String, FlagSpec> = serde_json::from_str(text)?;
        let flags = specs
            .into_iter()
            .map(|(name, spec)| (name, FlagSchema::from(spec)))
            .collect();
        Ok(Self { flags })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BuiltinType {
    String,
    Number,
    Boolean,
}

impl From<BuiltinType> for FlagType {
    fn from(kind: BuiltinType) -> Self {
        match kind {
            BuiltinType::String => Self::String,
            BuiltinType::Number => Self::Number,
            BuiltinType::Boolean => Self::Boolean,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeSpec {
    Single(BuiltinType),
    Multiple([BuiltinType; 1]),
}

impl From<TypeSpec> for FlagSchema {
    fn from(spec: TypeSpec) -> Self {
        match spec {
            TypeSpec::Single(kind) => Self::new(kind.into()),
            TypeSpec::Multiple([kind]) => Self::new(kind.into()).multiple(),
        }
    }
}

// Keys other than these are allowed and ignored.
#[derive(Debug, Deserialize)]
struct SchemaSpec {
    #[serde(rename = "type")]
    kind: TypeSpec,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default, deserialize_with = "present")]
    default: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlagSpec {
    Type(TypeSpec),
    Schema(SchemaSpec),
}

impl From<FlagSpec> for FlagSchema {
    fn from(spec: FlagSpec) -> Self {
        match spec {
            FlagSpec::Type(kind) => kind.into(),
            FlagSpec::Schema(spec) => {
                let mut schema = FlagSchema::from(spec.kind);
                schema.alias = spec.alias;
                schema.default = spec.default.map(|value| match value {
                    serde_json::Value::Null => FlagDefault::Unset,
                    value => FlagDefault::Value(value.into()),
                });
                schema
            }
        }
    }
}

// Keeps `null` as `Some(Value::Null)`; a missing key still falls back to `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
