//! Fix emitter: byte-range replacements for violations, and their application.
//!
//! Fixes only append or delete; they never reorder existing statements.

use crate::context::FileContext;
use crate::types::{Location, Replacement};
use std::ops::Range;

/// Maximum number of classify/check/apply rounds per file.
pub const MAX_FIX_PASSES: usize = 10;

/// Builds a replacement that deletes `range`.
#[must_use]
pub fn delete(ctx: &FileContext<'_>, range: Range<usize>) -> Replacement {
    Replacement::new(ctx.span_location(range), "")
}

/// Builds a replacement that deletes `range` and the whitespace after it,
/// up to the next token or the end of the file.
#[must_use]
pub fn delete_through_next_token(ctx: &FileContext<'_>, range: Range<usize>) -> Replacement {
    let rest = &ctx.content[range.end..];
    let skipped = rest.len() - rest.trim_start().len();
    delete(ctx, range.start..range.end + skipped)
}

/// Builds a replacement that appends `lines` after the last non-whitespace
/// character, one per line, with a single trailing newline.
#[must_use]
pub fn append_lines<S: AsRef<str>>(ctx: &FileContext<'_>, lines: &[S]) -> Replacement {
    let body_end = ctx.content.trim_end().len();
    let mut text = String::new();
    if body_end > 0 {
        text.push('\n');
    }
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(line.as_ref());
    }
    text.push('\n');
    Replacement::new(ctx.span_location(body_end..ctx.content.len()), text)
}

/// Applies non-overlapping replacements to `content`.
///
/// Replacements are applied in offset order; one that overlaps a
/// replacement already applied is skipped and left for a later pass.
/// Text starting with a newline that would land at the start of the file,
/// after only whitespace, is placed there without the blank lines.
/// Returns the new text and the number of replacements applied.
#[must_use]
pub fn apply(content: &str, replacements: &[&Replacement]) -> (String, usize) {
    let mut sorted: Vec<&Replacement> = replacements
        .iter()
        .copied()
        .filter(|r| r.range().end <= content.len())
        .collect();
    sorted.sort_by_key(|r| (r.location.offset, r.location.length));

    let mut output = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut applied = 0;
    for replacement in sorted {
        let range = replacement.range();
        if range.start < cursor {
            continue;
        }
        output.push_str(&content[cursor..range.start]);
        let text = replacement.new_text.as_str();
        if text.starts_with('\n') && output.trim().is_empty() {
            output.clear();
            output.push_str(text.trim_start_matches('\n'));
        } else {
            output.push_str(text);
        }
        cursor = range.end;
        applied += 1;
    }
    output.push_str(&content[cursor..]);
    (output, applied)
}

impl FileContext<'_> {
    /// Location spanning `range`, positioned at its start.
    #[must_use]
    pub fn span_location(&self, range: Range<usize>) -> Location {
        let (line, column) = self.line_col(range.start);
        Location::new(self.relative_path.clone(), line, column)
            .with_span(range.start, range.end.saturating_sub(range.start))
    }
}
