//! Story block operations on whole posts.
//!
//! A post's content is only ever changed through a [`PostEditor`], which
//! takes `&mut self` so a single writer rewrites a post at a time. The
//! scanner works on a snapshot of the content and has no conflict detection
//! of its own.

use tracing::{debug, info};

use crate::codec::build_story_block;
use crate::config::StoryBlockConfig;
use crate::error::Result;
use crate::media::AttachedMedia;
use crate::resolver::{Resolution, resolve_reference, strip_if_temporary};
use crate::scanner::{BlockMatch, PayloadEdit, for_each_block};
use crate::slides::{SiteId, SlideStore, migrate_slide};

/// A post as far as Story blocks are concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub local_site_id: SiteId,
    pub content: String,
}

impl Post {
    pub fn new(local_site_id: SiteId, content: impl Into<String>) -> Self {
        Self {
            local_site_id,
            content: content.into(),
        }
    }
}

/// Read-modify-write access to a post.
pub trait PostEditor {
    /// Run `action` on the post. The action returns whether it changed
    /// anything, and that value is passed back to the caller.
    fn update<F>(&mut self, action: F) -> bool
    where
        F: FnOnce(&mut Post) -> bool;
}

impl PostEditor for Post {
    fn update<F>(&mut self, action: F) -> bool
    where
        F: FnOnce(&mut Post) -> bool,
    {
        action(self)
    }
}

/// Upload completion event for a media file referenced by a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub local_id: u64,
    pub remote_id: u64,
    /// Final URL of the uploaded file
    pub url: String,
    pub is_video: bool,
    pub mime_type: String,
}

/// Story block use cases bound to a configuration and a slide store.
#[derive(Debug)]
pub struct StoryBlockService<S> {
    config: StoryBlockConfig,
    slides: S,
}

impl<S: SlideStore> StoryBlockService<S> {
    pub fn new(config: StoryBlockConfig, slides: S) -> Self {
        Self { config, slides }
    }

    pub fn config(&self) -> &StoryBlockConfig {
        &self.config
    }

    pub fn slides(&self) -> &S {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut S {
        &mut self.slides
    }

    pub fn into_slides(self) -> S {
        self.slides
    }

    /// Replace the post's content with a single block holding `media`.
    pub fn build_story_block_in_post<E: PostEditor>(
        &self,
        editor: &mut E,
        media: &[AttachedMedia],
    ) -> Result<()> {
        let block = build_story_block(media)?;
        editor.update(|post| {
            post.content = block;
            true
        });
        Ok(())
    }

    /// Rewrite every block payload in the post with the configured scanner.
    pub fn for_each_story_block<F>(&self, post: &mut Post, transform: F)
    where
        F: FnMut(&BlockMatch<'_>) -> PayloadEdit,
    {
        post.content = for_each_block(&post.content, self.config.scan, transform);
    }

    /// Drop the media list of every block that still has temporary ids.
    ///
    /// Returns whether the content changed.
    pub fn clean_temporary_media_files<E: PostEditor>(&self, editor: &mut E) -> bool {
        editor.update(|post| {
            let before = post.content.clone();
            self.for_each_story_block(post, |block| strip_if_temporary(block.payload));
            post.content != before
        })
    }

    /// Swap a finished upload's local id for its remote id in every block,
    /// then move the cached slide to the remote-id key.
    ///
    /// Returns whether any block referenced the local id. Content is left
    /// byte-for-byte unchanged when none did.
    ///
    /// The rewrite is committed before the slide is migrated. An
    /// `Err(Error::SlideStore)` therefore means the post already carries the
    /// remote id and only the cached slide is still under its local key.
    pub fn replace_local_media_id<E: PostEditor>(
        &mut self,
        editor: &mut E,
        upload: &UploadedMedia,
    ) -> Result<bool> {
        let remote_id = upload.remote_id.to_string();
        let resolution = Resolution {
            local_id: upload.local_id,
            remote_id: &remote_id,
            url: &upload.url,
        };
        let scan = self.config.scan;

        let mut site = None;
        editor.update(|post| {
            let mut matched = false;
            post.content = for_each_block(&post.content, scan, |block| {
                let edit = resolve_reference(block.payload, &resolution);
                matched |= !edit.is_keep();
                edit
            });
            if matched {
                site = Some(post.local_site_id);
            }
            matched
        });

        let Some(site) = site else {
            debug!(
                local_id = upload.local_id,
                is_video = upload.is_video,
                "No story block references uploaded media"
            );
            return Ok(false);
        };

        info!(
            %site,
            local_id = upload.local_id,
            remote_id = upload.remote_id,
            is_video = upload.is_video,
            mime_type = %upload.mime_type,
            "Resolved story media to remote id"
        );
        migrate_slide(&mut self.slides, site, upload.local_id, upload.remote_id)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BLOCK_CLOSING, BLOCK_DIV, BLOCK_START, build_story_block_from_files};
    use crate::media::{MediaType, StoryMediaFile};
    use crate::error::Error;
    use crate::slides::{InMemorySlideStore, SlideKey, StorySlide};
    use pretty_assertions::assert_eq;
    use std::io;

    /// Slide store whose backing storage is gone.
    struct UnavailableSlideStore;

    impl SlideStore for UnavailableSlideStore {
        type Error = io::Error;

        fn get(&self, _: SiteId, _: SlideKey) -> io::Result<Option<StorySlide>> {
            Err(io::Error::other("storage unavailable"))
        }

        fn put(&mut self, _: SiteId, _: SlideKey, _: &StorySlide) -> io::Result<()> {
            Err(io::Error::other("storage unavailable"))
        }

        fn delete(&mut self, _: SiteId, _: SlideKey) -> io::Result<()> {
            Err(io::Error::other("storage unavailable"))
        }
    }

    fn service() -> StoryBlockService<InMemorySlideStore> {
        StoryBlockService::new(StoryBlockConfig::default(), InMemorySlideStore::new())
    }

    fn media(id: u64) -> AttachedMedia {
        AttachedMedia {
            id,
            file_url: Some(format!("file:///{id}.jpg")),
            mime_type: Some("image/jpeg".into()),
            is_video: false,
        }
    }

    fn upload(local_id: u64, remote_id: u64) -> UploadedMedia {
        UploadedMedia {
            local_id,
            remote_id,
            url: format!("https://cdn.example.com/{remote_id}.jpg"),
            is_video: false,
            mime_type: "image/jpeg".into(),
        }
    }

    #[test]
    fn build_replaces_post_content() {
        let mut post = Post::new(SiteId(1), "old body");
        service().build_story_block_in_post(&mut post, &[media(1)]).unwrap();
        assert!(post.content.starts_with(BLOCK_START));
        assert!(post.content.ends_with(BLOCK_CLOSING));
    }

    #[test]
    fn clean_strips_temporary_block_and_keeps_boilerplate() {
        let block =
            build_story_block_from_files(&[StoryMediaFile::temporary(&media(1), "abc")]).unwrap();
        let mut post = Post::new(SiteId(1), format!("before\n{block}\nafter"));

        assert!(service().clean_temporary_media_files(&mut post));
        assert_eq!(
            post.content,
            format!("before\n{BLOCK_START} -->\n{BLOCK_DIV}{BLOCK_CLOSING}\nafter")
        );
        assert!(!service().clean_temporary_media_files(&mut post));
    }

    #[test]
    fn replace_resolves_block_and_migrates_slide() {
        let mut service = service();
        let slide = StorySlide::new("file:///42.jpg", MediaType::Image);
        service.slides_mut().put(SiteId(3), SlideKey::Local(42), &slide).unwrap();
        let mut post = Post::new(SiteId(3), String::new());
        service.build_story_block_in_post(&mut post, &[media(42)]).unwrap();

        assert!(service.replace_local_media_id(&mut post, &upload(42, 99)).unwrap());

        assert!(post.content.contains(r#""id":"99""#));
        assert!(post.content.contains("https://cdn.example.com/99.jpg"));
        assert!(service.slides().get(SiteId(3), SlideKey::Local(42)).unwrap().is_none());
        assert!(service.slides().get(SiteId(3), SlideKey::Remote(99)).unwrap().is_some());
    }

    #[test]
    fn slide_store_failure_after_rewrite_keeps_rewritten_post() {
        let config = StoryBlockConfig::default();
        let mut service = StoryBlockService::new(config, UnavailableSlideStore);
        let mut post = Post::new(SiteId(3), String::new());
        service.build_story_block_in_post(&mut post, &[media(42)]).unwrap();

        let err = service.replace_local_media_id(&mut post, &upload(42, 99)).unwrap_err();

        assert!(matches!(
            err,
            Error::SlideStore { site: SiteId(3), key: SlideKey::Local(42), .. }
        ));
        assert!(post.content.contains(r#""id":"99""#));
    }

    #[test]
    fn video_upload_resolves_like_image() {
        let mut service = service();
        let mut post = Post::new(SiteId(3), String::new());
        service.build_story_block_in_post(&mut post, &[media(42)]).unwrap();
        let video = UploadedMedia {
            is_video: true,
            mime_type: "video/mp4".into(),
            ..upload(42, 99)
        };

        assert!(service.replace_local_media_id(&mut post, &video).unwrap());
        assert!(post.content.contains(r#""id":"99""#));
    }

    #[test]
    fn replace_without_reference_leaves_post_alone() {
        let mut service = service();
        let mut post = Post::new(SiteId(3), String::new());
        service.build_story_block_in_post(&mut post, &[media(1)]).unwrap();
        let before = post.clone();

        assert!(!service.replace_local_media_id(&mut post, &upload(42, 99)).unwrap());
        assert_eq!(post, before);
    }
}
