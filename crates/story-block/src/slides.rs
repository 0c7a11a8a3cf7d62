//! Offline slide records and the store they are kept in.
//!
//! The story editor caches each slide per site, keyed by the media id it was
//! saved under. When an upload completes the record has to move from its
//! local-id key to its remote-id key; [`migrate_slide`] does that against any
//! [`SlideStore`].

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::media::MediaType;

/// Local site id a post belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SiteId(pub u64);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key a slide record is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlideKey {
    Local(u64),
    Remote(u64),
}

impl SlideKey {
    /// Parse the persisted form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(id) = s.strip_prefix("local-") {
            return id.parse().ok().map(Self::Local);
        }
        if let Some(id) = s.strip_prefix("remote-") {
            return id.parse().ok().map(Self::Remote);
        }
        None
    }
}

impl fmt::Display for SlideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlideKey::Local(id) => write!(f, "local-{id}"),
            SlideKey::Remote(id) => write!(f, "remote-{id}"),
        }
    }
}

/// A cached story slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySlide {
    /// Media id the slide currently refers to, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Local file URI or remote URL of the background media
    pub source: String,
    #[serde(default)]
    pub media_type: MediaType,
    /// Editor state not interpreted here (text overlays, stickers, ...)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,
}

impl StorySlide {
    pub fn new(source: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            id: None,
            source: source.into(),
            media_type,
            extras: Map::new(),
        }
    }
}

/// Per-site keyed storage of slide records.
pub trait SlideStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(
        &self,
        site: SiteId,
        key: SlideKey,
    ) -> std::result::Result<Option<StorySlide>, Self::Error>;

    fn put(
        &mut self,
        site: SiteId,
        key: SlideKey,
        slide: &StorySlide,
    ) -> std::result::Result<(), Self::Error>;

    fn delete(&mut self, site: SiteId, key: SlideKey) -> std::result::Result<(), Self::Error>;
}

/// In-memory slide store
#[derive(Debug, Clone, Default)]
pub struct InMemorySlideStore {
    slides: BTreeMap<(SiteId, SlideKey), StorySlide>,
}

impl InMemorySlideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

impl SlideStore for InMemorySlideStore {
    type Error = Infallible;

    fn get(
        &self,
        site: SiteId,
        key: SlideKey,
    ) -> std::result::Result<Option<StorySlide>, Infallible> {
        Ok(self.slides.get(&(site, key)).cloned())
    }

    fn put(
        &mut self,
        site: SiteId,
        key: SlideKey,
        slide: &StorySlide,
    ) -> std::result::Result<(), Infallible> {
        self.slides.insert((site, key), slide.clone());
        Ok(())
    }

    fn delete(&mut self, site: SiteId, key: SlideKey) -> std::result::Result<(), Infallible> {
        self.slides.remove(&(site, key));
        Ok(())
    }
}

/// Move a slide from its local-id key to its remote-id key.
///
/// The moved slide's `id` is set to the remote id. Returns `false` when no
/// slide was stored under the local id.
pub fn migrate_slide<S: SlideStore>(
    store: &mut S,
    site: SiteId,
    local_id: u64,
    remote_id: u64,
) -> Result<bool> {
    let local_key = SlideKey::Local(local_id);
    let remote_key = SlideKey::Remote(remote_id);

    let Some(mut slide) = store
        .get(site, local_key)
        .map_err(|e| Error::slide_store(site, local_key, e))?
    else {
        debug!(%site, %local_key, "No cached slide to migrate");
        return Ok(false);
    };

    slide.id = Some(remote_id.to_string());
    store
        .put(site, remote_key, &slide)
        .map_err(|e| Error::slide_store(site, remote_key, e))?;
    store
        .delete(site, local_key)
        .map_err(|e| Error::slide_store(site, local_key, e))?;

    info!(%site, %local_key, %remote_key, "Migrated cached slide");
    Ok(true)
}
