//! Story block handling for post content.
//!
//! A Story block is an HTML-comment fragment embedded in a post body that
//! carries a JSON list of media files:
//!
//! ```text
//! <!-- wp:jetpack/story {"mediaFiles":[{"alt":"","id":"123",...}]} -->
//! <div class="wp-story wp-block-jetpack-story"></div>
//! <!-- /wp:jetpack/story -->
//! ```
//!
//! The crate is split into layers:
//!
//! - [`codec`] and [`media`]: encode media lists into block text and decode
//!   JSON payloads back into typed descriptors.
//! - [`scanner`]: walk post content, hand each block payload to a transform
//!   and splice the result back.
//! - [`resolver`]: the two stock transforms, stripping media lists that still
//!   hold temporary ids and resolving a local id to its remote id.
//! - [`post`]: the post-level use case tying the above to a post editor and a
//!   [`SlideStore`].
//!
//! Nothing in the rewrite pipeline fails on malformed content: a payload that
//! cannot be decoded is left exactly as it was.

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod post;
pub mod resolver;
pub mod scanner;
pub mod slides;

pub use codec::{build_story_block, build_story_block_from_files, decode_payload, encode_block};
pub use config::{ScanStrategy, StoryBlockConfig};
pub use error::{Error, Result};
pub use media::{AttachedMedia, MediaIdentity, MediaType, StoryBlockData, StoryMediaFile};
pub use post::{Post, PostEditor, StoryBlockService, UploadedMedia};
pub use resolver::{Resolution, has_temporary_ids, resolve_reference, strip_if_temporary};
pub use scanner::{BlockMatch, PayloadEdit, for_each_block};
pub use slides::{InMemorySlideStore, SiteId, SlideKey, SlideStore, StorySlide, migrate_slide};
