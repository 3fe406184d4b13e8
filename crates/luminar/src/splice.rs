//! In-place removal of consumed argv tokens.

use crate::dispatch::Index;

/// Remove every recorded [`Index`] from `argv`.
///
/// `removals` must be in the order the dispatcher reported them. They are
/// applied back to front, so removing one entry never shifts a position or
/// alias offset that is still waiting to be applied.
///
/// For an alias index only the alias character is dropped, plus the inline
/// value when it is the last alias of its cluster. A cluster reduced to a
/// bare `-` is removed entirely.
pub fn splice_from_argv(argv: &mut Vec<String>, removals: &[Index]) {
    for index in removals.iter().rev() {
        let position = index.position();
        let Some(arg) = argv.get(position) else {
            tracing::warn!(position, len = argv.len(), "removal index out of range");
            continue;
        };

        if let Index::Alias {
            offset, is_last, ..
        } = *index
        {
            let mut spliced: String = arg.chars().take(offset).collect();
            if !is_last {
                spliced.extend(arg.chars().skip(offset + 1));
            }

            if spliced != "-" {
                argv[position] = spliced;
                continue;
            }
        }

        argv.remove(position);
    }
}
