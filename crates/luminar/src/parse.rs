//! Schema-driven argv parsing.
//!
//! [`parse`] reads every declared flag, collects unknown flags and
//! positional arguments, and removes everything it consumed from argv.
//! [`get_flag`] pulls a single flag out of argv and leaves the rest alone.

use std::ops::Deref;

use indexmap::IndexMap;
use serde::Serialize;

use crate::dispatch::{ArgvVisitor, Index, argv_iterator};
use crate::registry::Registry;
use crate::schema::{FlagSchema, FlagValue, Schema};
use crate::splice::splice_from_argv;
use crate::token::parse_flag_argv;

/// Positional arguments, in argv order.
///
/// Everything after `--` is included and also kept separately in
/// [`Arguments::end_of_flags`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Arguments {
    #[serde(rename = "_")]
    args: Vec<String>,
    end_of_flags: Vec<String>,
}

impl Arguments {
    pub fn end_of_flags(&self) -> &[String] {
        &self.end_of_flags
    }
}

impl Deref for Arguments {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.args
    }
}

/// Result of [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Parsed {
    /// One entry per declared flag, in declaration order. `None` when the
    /// flag never appeared and has no default.
    pub flags: IndexMap<String, Option<FlagValue>>,
    /// Flags missing from the schema, keyed by the name used in argv. Each
    /// occurrence is its inline value or `true`.
    pub unknown_flags: IndexMap<String, Vec<FlagValue>>,
    pub arguments: Arguments,
}

impl Parsed {
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name).and_then(Option::as_ref)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.flag(name).and_then(FlagValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.flag(name).and_then(FlagValue::as_bool)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.flag(name).and_then(FlagValue::as_number)
    }

    pub fn get_list(&self, name: &str) -> Option<&[FlagValue]> {
        self.flag(name).and_then(FlagValue::as_list)
    }
}

/// An argv event offered to [`ParseOptions::ignore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored<'a> {
    KnownFlag { name: &'a str, value: Option<&'a str> },
    UnknownFlag { name: &'a str, value: Option<&'a str> },
    /// A positional argument. For the batch after `--` this is the `--`
    /// itself.
    Argument(&'a str),
}

type IgnoreFn<'f> = dyn FnMut(Ignored<'_>) -> bool + 'f;

/// Options for [`parse_with`].
#[derive(Default)]
pub struct ParseOptions<'f> {
    ignore: Option<Box<IgnoreFn<'f>>>,
}

impl<'f> ParseOptions<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip argv events for which `ignore` returns `true`.
    ///
    /// Ignored events leave no trace: the tokens stay in argv and nothing is
    /// recorded in the result.
    pub fn ignore<F>(mut self, ignore: F) -> Self
    where
        F: FnMut(Ignored<'_>) -> bool + 'f,
    {
        self.ignore = Some(Box::new(ignore));
        self
    }

    fn is_ignored(&mut self, event: Ignored<'_>) -> bool {
        self.ignore.as_mut().is_some_and(|ignore| ignore(event))
    }
}

/// A flag occurrence waiting for its value.
struct AwaitingValue {
    slot: usize,
    index: Index,
}

struct ParseVisitor<'a, 's, 'f> {
    argv: &'a [String],
    registry: Registry<'s>,
    options: ParseOptions<'f>,
    unknown_flags: IndexMap<String, Vec<FlagValue>>,
    arguments: Arguments,
    removals: Vec<Index>,
    truncate_at: Option<usize>,
}

impl ParseVisitor<'_, '_, '_> {
    fn record(
        &mut self,
        slot: usize,
        flag_index: Index,
        value: &str,
        value_index: Option<Index>,
    ) -> anyhow::Result<()> {
        let parsed = self.registry.slot(slot).schema.kind.apply(value)?;
        self.removals.push(flag_index);
        self.removals.extend(value_index);
        self.registry.push(slot, parsed);
        Ok(())
    }
}

impl ArgvVisitor for ParseVisitor<'_, '_, '_> {
    type Pending = AwaitingValue;
    type Error = anyhow::Error;

    fn on_flag(
        &mut self,
        name: &str,
        value: Option<&str>,
        index: Index,
    ) -> anyhow::Result<Option<AwaitingValue>> {
        let known = self.registry.lookup(name);
        let event = match known {
            Some(_) => Ignored::KnownFlag { name, value },
            None => Ignored::UnknownFlag { name, value },
        };
        if self.options.is_ignored(event) {
            return Ok(None);
        }

        let Some(slot) = known else {
            let occurrence = match value {
                Some(value) => FlagValue::from(value),
                None => FlagValue::Bool(true),
            };
            self.unknown_flags
                .entry(name.to_string())
                .or_default()
                .push(occurrence);
            self.removals.push(index);
            return Ok(None);
        };

        let kind = &self.registry.slot(slot).schema.kind;
        match kind.immediate(value) {
            Some(immediate) => {
                let parsed = kind.resolve(immediate)?;
                self.removals.push(index);
                self.registry.push(slot, parsed);
                Ok(None)
            }
            None => Ok(Some(AwaitingValue { slot, index })),
        }
    }

    fn on_value(
        &mut self,
        pending: AwaitingValue,
        value: Option<&str>,
        index: Option<Index>,
    ) -> anyhow::Result<()> {
        self.record(pending.slot, pending.index, value.unwrap_or(""), index)
    }

    fn on_argument(
        &mut self,
        args: &[String],
        index: Index,
        end_of_flags: bool,
    ) -> anyhow::Result<()> {
        let argv = self.argv;
        let position = index.position();
        if self.options.is_ignored(Ignored::Argument(&argv[position])) {
            return Ok(());
        }

        self.arguments.args.extend_from_slice(args);
        if end_of_flags {
            self.arguments.end_of_flags = args.to_vec();
            self.truncate_at = Some(position);
        } else {
            self.removals.push(index);
        }
        Ok(())
    }
}

/// Parse `argv` against `schema`, removing every consumed token from it.
///
/// Schema errors and errors from custom parsers are returned as-is, and
/// argv is left untouched when an error occurs.
pub fn parse(schema: &Schema, argv: &mut Vec<String>) -> anyhow::Result<Parsed> {
    parse_with(schema, argv, ParseOptions::default())
}

/// [`parse`] with options.
pub fn parse_with(
    schema: &Schema,
    argv: &mut Vec<String>,
    options: ParseOptions<'_>,
) -> anyhow::Result<Parsed> {
    let registry = Registry::new(schema)?;
    let (flags, unknown_flags, arguments, removals, truncate_at) = {
        let mut visitor = ParseVisitor {
            argv: argv.as_slice(),
            registry,
            options,
            unknown_flags: IndexMap::new(),
            arguments: Arguments::default(),
            removals: Vec::new(),
            truncate_at: None,
        };
        argv_iterator(argv, &mut visitor)?;
        (
            visitor.registry.finalize(),
            visitor.unknown_flags,
            visitor.arguments,
            visitor.removals,
            visitor.truncate_at,
        )
    };

    // every removal lies before the `--`, so truncating first is safe
    if let Some(position) = truncate_at {
        argv.truncate(position);
    }
    splice_from_argv(argv, &removals);

    tracing::debug!(
        removed = removals.len(),
        unknown = unknown_flags.len(),
        arguments = arguments.len(),
        remaining = argv.len(),
        "argv parsed"
    );

    Ok(Parsed {
        flags,
        unknown_flags,
        arguments,
    })
}

struct GetFlagVisitor<'n> {
    names: Vec<&'n str>,
    schema: &'n FlagSchema,
    results: Vec<FlagValue>,
    removals: Vec<Index>,
}

impl GetFlagVisitor<'_> {
    fn record(&mut self, value: FlagValue, flag_index: Index, value_index: Option<Index>) {
        self.removals.push(flag_index);
        self.removals.extend(value_index);
        self.results.push(value);
    }
}

impl ArgvVisitor for GetFlagVisitor<'_> {
    type Pending = Index;
    type Error = anyhow::Error;

    fn on_flag(
        &mut self,
        name: &str,
        value: Option<&str>,
        index: Index,
    ) -> anyhow::Result<Option<Index>> {
        if !self.names.iter().any(|n| *n == name) {
            return Ok(None);
        }
        // single mode keeps the first occurrence and leaves the rest in argv
        if !self.schema.multiple && !self.results.is_empty() {
            return Ok(None);
        }

        match self.schema.kind.immediate(value) {
            Some(immediate) => {
                let parsed = self.schema.kind.resolve(immediate)?;
                self.record(parsed, index, None);
                Ok(None)
            }
            None => Ok(Some(index)),
        }
    }

    fn on_value(
        &mut self,
        flag_index: Index,
        value: Option<&str>,
        index: Option<Index>,
    ) -> anyhow::Result<()> {
        let parsed = self.schema.kind.apply(value.unwrap_or(""))?;
        self.record(parsed, flag_index, index);
        Ok(())
    }
}

/// Extract one flag from `argv`, removing only the tokens it consumed.
///
/// `names` is a comma-separated list in flag syntax, e.g. `"--boolean,-b"`.
/// A single-value schema takes the first occurrence and leaves later ones in
/// argv; a multi-value schema collects every occurrence into a list.
pub fn get_flag(
    names: &str,
    schema: impl Into<FlagSchema>,
    argv: &mut Vec<String>,
) -> anyhow::Result<Option<FlagValue>> {
    let schema = schema.into();
    let names = names
        .split(',')
        .filter_map(parse_flag_argv)
        .map(|token| token.name)
        .collect();
    let mut visitor = GetFlagVisitor {
        names,
        schema: &schema,
        results: Vec::new(),
        removals: Vec::new(),
    };
    argv_iterator(argv, &mut visitor)?;

    let GetFlagVisitor {
        results, removals, ..
    } = visitor;
    splice_from_argv(argv, &removals);

    tracing::debug!(
        occurrences = results.len(),
        remaining = argv.len(),
        "flag extracted"
    );

    Ok(if schema.multiple {
        Some(FlagValue::List(results))
    } else {
        results.into_iter().next()
    })
}
