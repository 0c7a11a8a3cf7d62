//! Encoding and decoding of Story blocks.
//!
//! A block is written as:
//! ```text
//! <!-- wp:jetpack/story {"mediaFiles":[...]} -->
//! <div class="wp-story wp-block-jetpack-story"></div>
//! <!-- /wp:jetpack/story -->
//! ```
//! Only standard JSON escaping is applied to the payload. Field values must
//! not contain ` -->`, which would close the comment early.

use tracing::debug;

use crate::error::Result;
use crate::media::{AttachedMedia, StoryBlockData, StoryMediaFile};

/// Opening marker. The trailing space separates it from the payload.
pub const BLOCK_START: &str = "<!-- wp:jetpack/story ";
/// Marker closing the opening comment, right after the payload.
pub const BLOCK_END: &str = " -->\n";
/// Placeholder element written after every block comment.
pub const BLOCK_DIV: &str = "<div class=\"wp-story wp-block-jetpack-story\"></div>\n";
/// Closing comment of the block.
pub const BLOCK_CLOSING: &str = "<!-- /wp:jetpack/story -->";

/// Serialize the payload object alone, without markers.
pub fn encode_payload(data: &StoryBlockData) -> Result<String> {
    Ok(serde_json::to_string(data)?)
}

/// Encode a full block: markers, payload and trailing boilerplate.
pub fn encode_block(data: &StoryBlockData) -> Result<String> {
    let payload = encode_payload(data)?;
    let mut block = String::with_capacity(
        BLOCK_START.len() + payload.len() + BLOCK_END.len() + BLOCK_DIV.len() + BLOCK_CLOSING.len(),
    );
    block.push_str(BLOCK_START);
    block.push_str(&payload);
    block.push_str(BLOCK_END);
    block.push_str(BLOCK_DIV);
    block.push_str(BLOCK_CLOSING);
    Ok(block)
}

/// Decode a payload extracted from between the block markers.
///
/// Returns `None` for malformed JSON; callers leave such occurrences as-is.
pub fn decode_payload(payload: &str) -> Option<StoryBlockData> {
    match serde_json::from_str(payload) {
        Ok(data) => Some(data),
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable story block payload");
            None
        }
    }
}

/// Encode a block describing the given attached media under their local ids.
pub fn build_story_block(media: &[AttachedMedia]) -> Result<String> {
    let files = media.iter().map(StoryMediaFile::from_attached).collect();
    encode_block(&StoryBlockData::new(files))
}

/// Encode a block from already built descriptors.
pub fn build_story_block_from_files(files: &[StoryMediaFile]) -> Result<String> {
    encode_block(&StoryBlockData::new(files.to_vec()))
}
