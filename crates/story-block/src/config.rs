//! Configuration for Story block processing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How the scanner locates block payloads and applies edits.
///
/// Content written by older clients was processed with a global end-marker
/// search and a replace-by-value rewrite. Both are kept available under
/// [`ScanStrategy::Legacy`]; new callers should use the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    /// Each block's end marker must come before the next start marker.
    /// Edits are spliced by byte range and touch only their own block.
    #[default]
    Scoped,

    /// The end marker is the next ` -->\n` anywhere after the start marker,
    /// and an edit replaces every verbatim copy of the payload text in the
    /// content, including copies outside any block.
    Legacy,
}

impl FromStr for ScanStrategy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scoped" => Ok(ScanStrategy::Scoped),
            "legacy" | "compat" => Ok(ScanStrategy::Legacy),
            _ => Err(Error::InvalidScanStrategy {
                strategy: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStrategy::Scoped => write!(f, "scoped"),
            ScanStrategy::Legacy => write!(f, "legacy"),
        }
    }
}

/// Story block processing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBlockConfig {
    /// Scanner behavior for locating and rewriting payloads
    #[serde(default)]
    pub scan: ScanStrategy,
}

impl StoryBlockConfig {
    pub fn with_scan(scan: ScanStrategy) -> Self {
        Self { scan }
    }
}
