//! Payload transforms applied when uploads complete or posts are cleaned up.
//!
//! Both functions take the payload text of a single block and return a
//! [`PayloadEdit`] for the scanner. Undecodable payloads always yield
//! [`PayloadEdit::Keep`].

use tracing::{debug, warn};

use crate::codec::{decode_payload, encode_payload};
use crate::media::{MediaIdentity, StoryBlockData};
use crate::scanner::PayloadEdit;

/// A completed upload: the local id a block may still reference and the
/// values replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub local_id: u64,
    pub remote_id: &'a str,
    pub url: &'a str,
}

/// Check whether any media file in the payload still has a temporary id.
pub fn has_temporary_ids(data: &StoryBlockData) -> bool {
    data.media_files.iter().any(|file| file.identity.is_temporary())
}

/// Remove the whole payload of a block that still references temporary ids.
///
/// The markers and boilerplate of the block stay in place, so the block
/// degrades to one with no media list at all. Applying this twice is the
/// same as applying it once: an empty payload no longer decodes.
pub fn strip_if_temporary(payload: &str) -> PayloadEdit {
    let Some(data) = decode_payload(payload) else {
        return PayloadEdit::Keep;
    };

    if has_temporary_ids(&data) {
        debug!(files = data.media_files.len(), "Removing media list with temporary ids");
        PayloadEdit::Remove
    } else {
        PayloadEdit::Keep
    }
}

/// Point the first media file carrying `local_id` at its uploaded remote copy.
///
/// Sets the identity to the remote id and both `link` and `url` to the final
/// URL, then re-encodes the whole list. Other entries are written back
/// unchanged. Returns [`PayloadEdit::Keep`] when nothing matches.
pub fn resolve_reference(payload: &str, resolution: &Resolution<'_>) -> PayloadEdit {
    let Some(mut data) = decode_payload(payload) else {
        return PayloadEdit::Keep;
    };

    let Some(file) = data
        .media_files
        .iter_mut()
        .find(|file| file.identity.is_local_id(resolution.local_id))
    else {
        return PayloadEdit::Keep;
    };

    file.identity = MediaIdentity::Permanent(resolution.remote_id.to_string());
    file.link = resolution.url.to_string();
    file.url = resolution.url.to_string();

    match encode_payload(&data) {
        Ok(json) => PayloadEdit::Replace(json),
        Err(e) => {
            warn!(error = %e, local_id = resolution.local_id, "Failed to re-encode story block");
            PayloadEdit::Keep
        }
    }
}
