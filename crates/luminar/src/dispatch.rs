//! Single-pass walk over argv.
//!
//! [`argv_iterator`] drives an [`ArgvVisitor`] with flag, value and argument
//! events. Every event carries an [`Index`] so the visitor can record what it
//! consumed and later hand the records to [`crate::splice_from_argv`].

use crate::token::{DOUBLE_DASH, parse_flag_argv};

/// Location of a consumed argv token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    /// A whole argv element.
    Whole(usize),
    /// One character of an alias cluster.
    ///
    /// `offset` counts chars from the start of the element, dash included, so
    /// the first alias of `-abc` sits at offset 1. `is_last` marks the final
    /// alias of the cluster, which also owns any inline value after it.
    Alias {
        position: usize,
        offset: usize,
        is_last: bool,
    },
}

impl Index {
    /// The argv position this index points into.
    pub fn position(&self) -> usize {
        match *self {
            Self::Whole(position) | Self::Alias { position, .. } => position,
        }
    }
}

/// Receives events from [`argv_iterator`].
///
/// `on_flag` decides whether a flag still needs a value. Returning
/// `Some(pending)` asks for the next plain token; the dispatcher then calls
/// `on_value` exactly once with that token, or with `None` when another flag,
/// `--` or the end of argv comes first.
pub trait ArgvVisitor {
    /// State carried from `on_flag` to `on_value`.
    type Pending;
    /// Error that aborts the pass. The dispatcher never raises its own.
    type Error;

    fn on_flag(
        &mut self,
        name: &str,
        value: Option<&str>,
        index: Index,
    ) -> Result<Option<Self::Pending>, Self::Error> {
        let _ = (name, value, index);
        Ok(None)
    }

    fn on_value(
        &mut self,
        pending: Self::Pending,
        value: Option<&str>,
        index: Option<Index>,
    ) -> Result<(), Self::Error>;

    /// A positional argument, or with `end_of_flags` set, every element after
    /// `--` as one batch (`index` then points at the `--` itself).
    fn on_argument(
        &mut self,
        args: &[String],
        index: Index,
        end_of_flags: bool,
    ) -> Result<(), Self::Error> {
        let _ = (args, index, end_of_flags);
        Ok(())
    }
}

fn resolve<V: ArgvVisitor>(
    visitor: &mut V,
    pending: &mut Option<V::Pending>,
    value: Option<&str>,
    index: Option<Index>,
) -> Result<bool, V::Error> {
    match pending.take() {
        Some(p) => {
            visitor.on_value(p, value, index)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Walk `argv` once, left to right, reporting events to `visitor`.
///
/// The first visitor error stops the walk and is returned unchanged.
pub fn argv_iterator<V: ArgvVisitor>(argv: &[String], visitor: &mut V) -> Result<(), V::Error> {
    let mut pending: Option<V::Pending> = None;

    for (i, arg) in argv.iter().enumerate() {
        if arg == DOUBLE_DASH {
            resolve(visitor, &mut pending, None, None)?;
            tracing::trace!(position = i, remaining = argv.len() - i - 1, "end of flags");
            return visitor.on_argument(&argv[i + 1..], Index::Whole(i), true);
        }

        let Some(token) = parse_flag_argv(arg) else {
            if resolve(visitor, &mut pending, Some(arg.as_str()), Some(Index::Whole(i)))? {
                tracing::trace!(position = i, "value token");
            } else {
                visitor.on_argument(std::slice::from_ref(arg), Index::Whole(i), false)?;
            }
            continue;
        };

        // a flag never takes another flag as its value
        resolve(visitor, &mut pending, None, None)?;

        if token.is_alias {
            let count = token.name.chars().count();
            for (j, c) in token.name.chars().enumerate() {
                resolve(visitor, &mut pending, None, None)?;

                let is_last = j + 1 == count;
                let mut buf = [0u8; 4];
                let name: &str = c.encode_utf8(&mut buf);
                tracing::trace!(position = i, offset = j + 1, flag = name, "alias flag");
                pending = visitor.on_flag(
                    name,
                    if is_last { token.value } else { None },
                    Index::Alias {
                        position: i,
                        offset: j + 1,
                        is_last,
                    },
                )?;
            }
        } else {
            tracing::trace!(position = i, flag = token.name, "long flag");
            pending = visitor.on_flag(token.name, token.value, Index::Whole(i))?;
        }
    }

    resolve(visitor, &mut pending, None, None)?;
    Ok(())
}
