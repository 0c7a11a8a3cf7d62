//! JSON-file slide store
//!
//! Each site gets its own file at `<root>/site-<id>/slides.json` holding an
//! object keyed by the slide key (`local-<id>` or `remote-<id>`):
//!
//! ```json
//! {
//!   "local-12": { "source": "file:///DCIM/a.jpg", "media_type": "image" },
//!   "remote-3400": { "id": "3400", "source": "https://...", "media_type": "video" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use story_block::{SiteId, SlideKey, SlideStore, StorySlide};
use tracing::{debug, warn};

use crate::{Error, Result, io};

const SLIDES_FILE: &str = "slides.json";

/// Slide store persisting one JSON file per site under a root directory.
///
/// `put` and `delete` hold the site's `slides.json.lock` across the whole
/// load and save, so stores sharing a root do not lose each other's writes.
#[derive(Debug, Clone)]
pub struct FileSlideStore {
    root: PathBuf,
}

impl FileSlideStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the slide file for a site.
    pub fn site_file(&self, site: SiteId) -> PathBuf {
        self.root.join(format!("site-{site}")).join(SLIDES_FILE)
    }

    fn load_site(&self, site: SiteId) -> Result<BTreeMap<SlideKey, StorySlide>> {
        let path = self.site_file(site);
        let Some(content) = io::read_text_if_exists(&path)? else {
            return Ok(BTreeMap::new());
        };

        let raw: BTreeMap<String, StorySlide> =
            serde_json::from_str(&content).map_err(|source| Error::SlideRecord {
                path: path.clone(),
                source,
            })?;

        Ok(raw
            .into_iter()
            .filter_map(|(key, slide)| match SlideKey::parse(&key) {
                Some(key) => Some((key, slide)),
                None => {
                    warn!(path = %path.display(), %key, "Ignoring slide with unrecognized key");
                    None
                }
            })
            .collect())
    }

    fn save_site(&self, site: SiteId, slides: &BTreeMap<SlideKey, StorySlide>) -> Result<()> {
        let path = self.site_file(site);
        let raw: BTreeMap<String, &StorySlide> = slides
            .iter()
            .map(|(key, slide)| (key.to_string(), slide))
            .collect();
        let content = serde_json::to_string_pretty(&raw).map_err(|source| Error::SlideRecord {
            path: path.clone(),
            source,
        })?;
        io::write_text(&path, &content)
    }
}

impl SlideStore for FileSlideStore {
    type Error = Error;

    fn get(&self, site: SiteId, key: SlideKey) -> Result<Option<StorySlide>> {
        Ok(self.load_site(site)?.remove(&key))
    }

    fn put(&mut self, site: SiteId, key: SlideKey, slide: &StorySlide) -> Result<()> {
        let _lock = io::lock_exclusive(&self.site_file(site))?;
        let mut slides = self.load_site(site)?;
        slides.insert(key, slide.clone());
        self.save_site(site, &slides)?;
        debug!(%site, %key, "Saved slide");
        Ok(())
    }

    fn delete(&mut self, site: SiteId, key: SlideKey) -> Result<()> {
        let path = self.site_file(site);
        if !path.exists() {
            return Ok(());
        }
        let _lock = io::lock_exclusive(&path)?;
        let mut slides = self.load_site(site)?;
        if slides.remove(&key).is_none() {
            return Ok(());
        }
        self.save_site(site, &slides)?;
        debug!(%site, %key, "Deleted slide");
        Ok(())
    }
}
