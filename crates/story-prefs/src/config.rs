//! Format-agnostic configuration loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use story_block::StoryBlockConfig;
use tracing::debug;

use crate::{Error, Result, io};

/// Serialization format picked from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Format-agnostic configuration store.
///
/// The format follows the file extension: `.toml`, `.json`, `.yaml`/`.yml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let format = ConfigFormat::from_path(path)?;
        let content = io::read_text(path)?;

        let parse_error = |message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.name().into(),
            message,
        };

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
            }
        }
    }

    /// Save configuration to a file atomically.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;

        let serialize_error = |message: String| Error::ConfigSerialize {
            path: path.to_path_buf(),
            format: format.name().into(),
            message,
        };

        let content = match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            ConfigFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))?
            }
        };

        io::write_text(path, &content)
    }
}

/// Load the story block configuration, falling back to defaults when the
/// file does not exist.
pub fn load_story_config(path: &Path) -> Result<StoryBlockConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "No story block config, using defaults");
        return Ok(StoryBlockConfig::default());
    }
    ConfigStore::new().load(path)
}
