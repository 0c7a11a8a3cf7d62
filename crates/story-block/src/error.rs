//! Error types for story-block

use crate::slides::{SiteId, SlideKey};

/// Result type for story-block operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in story-block operations
///
/// Content rewriting itself never produces these; they come from encoding
/// and from the injected slide store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Slide store failed for {key} on site {site}: {source}")]
    SlideStore {
        site: SiteId,
        key: SlideKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid scan strategy: {strategy}")]
    InvalidScanStrategy { strategy: String },
}

impl Error {
    pub fn slide_store(
        site: SiteId,
        key: SlideKey,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SlideStore {
            site,
            key,
            source: Box::new(source),
        }
    }
}
