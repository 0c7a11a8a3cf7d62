//! Media file descriptors carried inside a Story block.
//!
//! The wire format predates typed identities: a temporary id is written as
//! `"tempid-<placeholder>"` in the `id` field and the placeholder is copied
//! into `alt`. [`MediaIdentity`] keeps that mapping at the serialization
//! boundary so the rest of the crate never inspects string prefixes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Prefix marking an `id` as a placeholder assigned before upload.
pub const TEMPORARY_ID_PREFIX: &str = "tempid-";

/// Identity of a media file inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaIdentity {
    /// A numeric local or remote media id, kept in string form.
    Permanent(String),
    /// A placeholder (without the `tempid-` prefix) for media still uploading.
    Temporary(String),
}

impl MediaIdentity {
    /// Create a permanent identity from a numeric id.
    pub fn permanent(id: u64) -> Self {
        Self::Permanent(id.to_string())
    }

    /// Create a temporary identity with a fresh random placeholder.
    pub fn new_temporary() -> Self {
        Self::Temporary(Uuid::new_v4().to_string())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// Check whether this is the permanent identity of the given local id.
    pub fn is_local_id(&self, local_id: u64) -> bool {
        match self {
            Self::Permanent(id) => *id == local_id.to_string(),
            Self::Temporary(_) => false,
        }
    }

    /// The value written to the `id` field on the wire.
    pub fn wire_id(&self) -> String {
        match self {
            Self::Permanent(id) => id.clone(),
            Self::Temporary(placeholder) => format!("{TEMPORARY_ID_PREFIX}{placeholder}"),
        }
    }

    fn from_wire_id(id: String) -> Self {
        match id.strip_prefix(TEMPORARY_ID_PREFIX) {
            Some(placeholder) => Self::Temporary(placeholder.to_string()),
            None => Self::Permanent(id),
        }
    }
}

impl fmt::Display for MediaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_id())
    }
}

/// Kind of media in a slide.
///
/// Writers only produce `"image"` and `"video"`, but any other string is
/// accepted on read and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Other(String),
}

impl MediaType {
    pub fn from_is_video(is_video: bool) -> Self {
        if is_video { Self::Video } else { Self::Image }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for MediaType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            _ => Self::Other(kind),
        }
    }
}

impl From<MediaType> for String {
    fn from(kind: MediaType) -> Self {
        match kind {
            MediaType::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media file attached to a post, as handed over by the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachedMedia {
    /// Local media id
    pub id: u64,
    /// Local or remote URL of the file, if known yet
    pub file_url: Option<String>,
    pub mime_type: Option<String>,
    pub is_video: bool,
}

/// One entry of a Story block's `mediaFiles` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireMediaFile", into = "WireMediaFile")]
pub struct StoryMediaFile {
    pub identity: MediaIdentity,
    /// Alt text. Not preserved for temporary identities, whose wire `alt`
    /// holds the placeholder instead.
    pub alt: String,
    pub link: String,
    pub media_type: MediaType,
    pub mime: String,
    pub caption: String,
    pub url: String,
}

impl StoryMediaFile {
    /// Describe an attached file under its local id.
    pub fn from_attached(media: &AttachedMedia) -> Self {
        Self::with_identity(media, MediaIdentity::permanent(media.id))
    }

    /// Describe an attached file under a temporary placeholder.
    pub fn temporary(media: &AttachedMedia, placeholder: impl Into<String>) -> Self {
        Self::with_identity(media, MediaIdentity::Temporary(placeholder.into()))
    }

    fn with_identity(media: &AttachedMedia, identity: MediaIdentity) -> Self {
        let file_url = media.file_url.clone().unwrap_or_default();
        Self {
            identity,
            alt: String::new(),
            link: file_url.clone(),
            media_type: MediaType::from_is_video(media.is_video),
            mime: media.mime_type.clone().unwrap_or_default(),
            caption: String::new(),
            url: file_url,
        }
    }
}

/// The JSON object carried by a Story block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBlockData {
    #[serde(rename = "mediaFiles")]
    pub media_files: Vec<StoryMediaFile>,
}

impl StoryBlockData {
    pub fn new(media_files: Vec<StoryMediaFile>) -> Self {
        Self { media_files }
    }
}

/// Field layout as it appears inside the block comment.
#[derive(Serialize, Deserialize)]
struct WireMediaFile {
    #[serde(default)]
    alt: String,
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "type")]
    media_type: MediaType,
    #[serde(default)]
    mime: String,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    url: String,
}

/// Read `"id": 42` as the string `"42"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match WireId::deserialize(deserializer)? {
        WireId::Text(id) => id,
        WireId::Number(id) => id.to_string(),
    })
}

impl From<WireMediaFile> for StoryMediaFile {
    fn from(wire: WireMediaFile) -> Self {
        let identity = MediaIdentity::from_wire_id(wire.id);
        let alt = if identity.is_temporary() {
            String::new()
        } else {
            wire.alt
        };
        Self {
            identity,
            alt,
            link: wire.link,
            media_type: wire.media_type,
            mime: wire.mime,
            caption: wire.caption,
            url: wire.url,
        }
    }
}

impl From<StoryMediaFile> for WireMediaFile {
    fn from(file: StoryMediaFile) -> Self {
        let id = file.identity.wire_id();
        let alt = match file.identity {
            MediaIdentity::Temporary(placeholder) => placeholder,
            MediaIdentity::Permanent(_) => file.alt,
        };
        Self {
            alt,
            id,
            link: file.link,
            media_type: file.media_type,
            mime: file.mime,
            caption: file.caption,
            url: file.url,
        }
    }
}
