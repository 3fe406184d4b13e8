//! Typed argv flag parsing.
//!
//! Flags are declared in a [`Schema`] and read from a mutable argv. Whatever
//! the parser consumes (flags, their values, positional arguments) is
//! removed from argv in place, so several parsers can take turns on the same
//! argument list.
//!
//! Supported syntax:
//! - `--name`, `--name=value` (also `:` and `.` as the delimiter)
//! - `-a` aliases, clustered as `-abc`, with an inline value on the last one
//!   (`-abc=value`)
//! - `--` ends flag parsing; everything after it is positional
//!
//! ```
//! use luminar::{FlagSchema, FlagType, Schema, parse};
//!
//! let schema = Schema::new()
//!     .flag("verbose", FlagSchema::new(FlagType::Boolean).alias("v"))
//!     .flag("size", FlagType::Number);
//! let mut argv: Vec<String> = ["-v", "--size", "3", "input.txt"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let parsed = parse(&schema, &mut argv)?;
//! assert_eq!(parsed.get_bool("verbose"), Some(true));
//! assert_eq!(parsed.get_number("size"), Some(3.0));
//! assert_eq!(&*parsed.arguments, ["input.txt".to_string()].as_slice());
//! assert!(argv.is_empty());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The lower-level pieces ([`argv_iterator`], [`splice_from_argv`]) are
//! public for callers that want their own flag semantics.

mod dispatch;
mod error;
mod parse;
mod registry;
mod schema;
mod splice;
mod token;

pub use dispatch::{ArgvVisitor, Index, argv_iterator};
pub use error::SchemaError;
pub use parse::{Arguments, Ignored, ParseOptions, Parsed, get_flag, parse, parse_with};
pub use registry::camel_to_kebab;
pub use schema::{FlagDefault, FlagSchema, FlagType, FlagValue, Parser, Schema};
pub use splice::splice_from_argv;
pub use token::{DOUBLE_DASH, Token, parse_flag_argv};
