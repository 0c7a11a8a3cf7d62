//! Locating Story blocks in post content and rewriting their payloads.
//!
//! [`for_each_block`] walks the content, hands every payload found between
//! [`BLOCK_START`] and [`BLOCK_END`] to a transform and applies the returned
//! [`PayloadEdit`]. How the end marker is located and how edits are applied
//! depends on the [`ScanStrategy`]; see its variants for the exact rules.

use std::ops::Range;

use tracing::{debug, warn};

use crate::codec::{BLOCK_END, BLOCK_START};
use crate::config::ScanStrategy;

/// One payload occurrence handed to a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch<'a> {
    /// The whole content as rewritten so far.
    pub content: &'a str,
    /// The text between the start marker and the end marker.
    pub payload: &'a str,
    /// Byte range of `payload` within `content`.
    pub span: Range<usize>,
}

/// What a transform wants done with a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadEdit {
    /// Leave the occurrence untouched.
    Keep,
    /// Replace the payload text.
    Replace(String),
    /// Remove the payload text, leaving markers and boilerplate in place.
    Remove,
}

impl PayloadEdit {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    fn into_replacement(self) -> Option<String> {
        match self {
            Self::Keep => None,
            Self::Replace(text) => Some(text),
            Self::Remove => Some(String::new()),
        }
    }
}

/// Apply `transform` to every Story block payload in `content`.
///
/// Never fails. A transform that cannot make sense of a payload should
/// return [`PayloadEdit::Keep`].
///
/// # Example
/// ```
/// use story_block::{PayloadEdit, ScanStrategy, for_each_block};
///
/// let content = "<!-- wp:jetpack/story {\"mediaFiles\":[]} -->\n<div></div>";
/// let result = for_each_block(content, ScanStrategy::Scoped, |_| PayloadEdit::Remove);
/// assert_eq!(result, "<!-- wp:jetpack/story  -->\n<div></div>");
/// ```
pub fn for_each_block<F>(content: &str, strategy: ScanStrategy, transform: F) -> String
where
    F: FnMut(&BlockMatch<'_>) -> PayloadEdit,
{
    match strategy {
        ScanStrategy::Scoped => scan_scoped(content, transform),
        ScanStrategy::Legacy => scan_legacy(content, transform),
    }
}

/// End marker must precede the next start marker; edits are spliced by range.
fn scan_scoped<F>(content: &str, mut transform: F) -> String
where
    F: FnMut(&BlockMatch<'_>) -> PayloadEdit,
{
    let mut out = content.to_string();
    let mut cursor = 0;

    while let Some(found) = out[cursor..].find(BLOCK_START) {
        let payload_start = cursor + found + BLOCK_START.len();
        let next_start = out[payload_start..]
            .find(BLOCK_START)
            .map_or(out.len(), |pos| payload_start + pos);

        let Some(end) = out[payload_start..next_start].find(BLOCK_END) else {
            warn!(offset = payload_start, "Skipping story block without end marker");
            cursor = payload_start;
            continue;
        };
        let payload_end = payload_start + end;

        let edit = transform(&BlockMatch {
            content: &out,
            payload: &out[payload_start..payload_end],
            span: payload_start..payload_end,
        });

        cursor = match edit.into_replacement() {
            Some(replacement) => {
                debug!(offset = payload_start, "Rewriting story block payload");
                out.replace_range(payload_start..payload_end, &replacement);
                payload_start + replacement.len()
            }
            None => payload_end,
        };
    }

    out
}

/// Global end-marker search and replace-by-value, kept for compatibility
/// with content written by older clients.
///
/// Two behaviors differ from [`ScanStrategy::Scoped`]: the end marker is the
/// first one anywhere after the start marker, even past the next block, and
/// an edit replaces every verbatim copy of the payload in the whole content.
fn scan_legacy<F>(content: &str, mut transform: F) -> String
where
    F: FnMut(&BlockMatch<'_>) -> PayloadEdit,
{
    let mut out = content.to_string();
    let mut cursor = 0;

    while cursor < out.len() {
        let Some(found) = out[cursor..].find(BLOCK_START) else {
            break;
        };
        let block_start = cursor + found;
        let payload_start = block_start + BLOCK_START.len();

        let Some(end) = out[payload_start..].find(BLOCK_END) else {
            warn!(offset = payload_start, "Story block end marker missing, stopping scan");
            break;
        };
        let payload_end = payload_start + end;
        let payload = out[payload_start..payload_end].to_string();

        let edit = transform(&BlockMatch {
            content: &out,
            payload: &payload,
            span: payload_start..payload_end,
        });

        if let Some(replacement) = edit.into_replacement() {
            // Replacing "" would insert the replacement between every char.
            if !payload.is_empty() {
                debug!(offset = payload_start, "Replacing story block payload by value");
                out = out.replace(&payload, &replacement);
            }
        }

        // Earlier copies of the payload may have been rewritten, so the old
        // offset is not guaranteed to sit on a char boundary any more.
        cursor = payload_start.min(out.len());
        while !out.is_char_boundary(cursor) {
            cursor += 1;
        }
    }

    out
}
