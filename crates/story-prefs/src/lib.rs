//! File-backed collaborators for story blocks
//!
//! Provides locked, atomic file I/O, a per-site JSON slide store and a
//! format-agnostic configuration loader.

pub mod config;
pub mod error;
pub mod io;
pub mod slides;

pub use config::{ConfigStore, load_story_config};
pub use error::{Error, Result};
pub use slides::FileSlideStore;
