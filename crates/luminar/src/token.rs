//! Classification of a single argv element.

/// The end-of-flags marker. Everything after it is positional.
pub const DOUBLE_DASH: &str = "--";

const VALUE_DELIMITERS: [char; 3] = ['.', ':', '='];

/// A flag-like argv element split into its parts.
///
/// Borrows from the argv element it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Flag name without leading dashes. For the alias form this may be a
    /// cluster of single-character aliases (`-abc` => `abc`).
    pub name: &'a str,
    /// Value attached with `=`, `:` or `.` (delimiter excluded).
    pub value: Option<&'a str>,
    /// Single-dash form (`-n`, `-abc`).
    pub is_alias: bool,
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse one argv element as a flag.
///
/// Returns `None` when the element is not flag syntax (`-` or `--` followed
/// by a word character), so the caller can treat it as a plain token.
pub fn parse_flag_argv(arg: &str) -> Option<Token<'_>> {
    let (rest, is_alias) = match arg.strip_prefix(DOUBLE_DASH) {
        Some(rest) => (rest, false),
        None => (arg.strip_prefix('-')?, true),
    };

    if !rest.chars().next().is_some_and(is_word_char) {
        return None;
    }

    let token = match rest.find(VALUE_DELIMITERS) {
        Some(at) => Token {
            name: &rest[..at],
            // delimiters are ASCII, so `at + 1` is a char boundary
            value: Some(&rest[at + 1..]),
            is_alias,
        },
        None => Token {
            name: rest,
            value: None,
            is_alias,
        },
    };
    Some(token)
}
