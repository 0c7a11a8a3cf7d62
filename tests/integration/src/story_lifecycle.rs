//! End-to-end story post lifecycle: attach media, complete uploads, clean up.

use pretty_assertions::assert_eq;
use story_block::codec::{BLOCK_CLOSING, BLOCK_DIV, BLOCK_START};
use story_block::{
    AttachedMedia, MediaIdentity, MediaType, PayloadEdit, Post, ScanStrategy, SiteId, SlideKey,
    SlideStore, StoryBlockService, StoryMediaFile, StorySlide, UploadedMedia,
    build_story_block_from_files, decode_payload, logging,
};
use story_prefs::{ConfigStore, FileSlideStore, load_story_config};
use tempfile::TempDir;

const SITE: SiteId = SiteId(17);

fn attached(id: u64, is_video: bool) -> AttachedMedia {
    let extension = if is_video { "mp4" } else { "jpg" };
    AttachedMedia {
        id,
        file_url: Some(format!("file:///storage/DCIM/{id}.{extension}")),
        mime_type: Some(if is_video { "video/mp4" } else { "image/jpeg" }.to_string()),
        is_video,
    }
}

fn uploaded(local_id: u64, remote_id: u64) -> UploadedMedia {
    UploadedMedia {
        local_id,
        remote_id,
        url: format!("https://example.files.wordpress.com/{remote_id}.jpg"),
        is_video: false,
        mime_type: "image/jpeg".to_string(),
    }
}

fn media_files(post: &Post) -> Vec<Vec<StoryMediaFile>> {
    let mut blocks = Vec::new();
    story_block::for_each_block(&post.content, ScanStrategy::Scoped, |block| {
        if let Some(data) = decode_payload(block.payload) {
            blocks.push(data.media_files);
        }
        PayloadEdit::Keep
    });
    blocks
}

fn file_service(temp: &TempDir) -> StoryBlockService<FileSlideStore> {
    let config = load_story_config(&temp.path().join("story.toml")).unwrap();
    StoryBlockService::new(config, FileSlideStore::new(temp.path().join("slides")))
}

#[test]
fn uploads_resolve_blocks_and_move_cached_slides() {
    let _ = logging::init();
    let temp = TempDir::new().unwrap();
    let mut service = file_service(&temp);

    for id in [1, 2] {
        let slide = StorySlide::new(format!("file:///storage/DCIM/{id}.jpg"), MediaType::Image);
        service.slides_mut().put(SITE, SlideKey::Local(id), &slide).unwrap();
    }

    let mut post = Post::new(SITE, "");
    service
        .build_story_block_in_post(&mut post, &[attached(1, false), attached(2, true)])
        .unwrap();

    assert!(service.replace_local_media_id(&mut post, &uploaded(1, 501)).unwrap());

    let blocks = media_files(&post);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0][0].identity, MediaIdentity::Permanent("501".into()));
    assert_eq!(blocks[0][0].url, "https://example.files.wordpress.com/501.jpg");
    assert_eq!(blocks[0][1], StoryMediaFile::from_attached(&attached(2, true)));

    // A repeated completion event finds nothing left to resolve.
    let before = post.clone();
    assert!(!service.replace_local_media_id(&mut post, &uploaded(1, 501)).unwrap());
    assert_eq!(post, before);

    assert!(service.replace_local_media_id(&mut post, &uploaded(2, 502)).unwrap());

    let slides = FileSlideStore::new(temp.path().join("slides"));
    for (local, remote) in [(1, 501), (2, 502)] {
        assert_eq!(slides.get(SITE, SlideKey::Local(local)).unwrap(), None);
        let slide = slides.get(SITE, SlideKey::Remote(remote)).unwrap().unwrap();
        assert_eq!(slide.id, Some(remote.to_string()));
    }
}

#[test]
fn abandoned_temporary_uploads_are_cleaned_from_post() {
    let temp = TempDir::new().unwrap();
    let service = file_service(&temp);

    let pending = build_story_block_from_files(&[
        StoryMediaFile::from_attached(&attached(1, false)),
        StoryMediaFile::temporary(&attached(2, false), "4f1c"),
    ])
    .unwrap();
    let done = build_story_block_from_files(&[StoryMediaFile::from_attached(&attached(3, false))])
        .unwrap();
    let mut post = Post::new(SITE, format!("<p>Trip</p>\n{pending}\n{done}\n"));

    assert!(service.clean_temporary_media_files(&mut post));

    assert_eq!(
        post.content,
        format!("<p>Trip</p>\n{BLOCK_START} -->\n{BLOCK_DIV}{BLOCK_CLOSING}\n{done}\n")
    );
    assert_eq!(media_files(&post), vec![vec![StoryMediaFile::from_attached(&attached(3, false))]]);
    assert!(!service.clean_temporary_media_files(&mut post));
}

#[test]
fn legacy_scan_from_config_file_is_honored() {
    let temp = TempDir::new().unwrap();
    ConfigStore::new()
        .save(
            &temp.path().join("story.toml"),
            &story_block::StoryBlockConfig::with_scan(ScanStrategy::Legacy),
        )
        .unwrap();
    let mut service = file_service(&temp);
    assert_eq!(service.config().scan, ScanStrategy::Legacy);

    let block = build_story_block_from_files(&[StoryMediaFile::from_attached(&attached(1, false))])
        .unwrap();
    let payload = block[BLOCK_START.len()..block.find(" -->\n").unwrap()].to_string();
    let mut post = Post::new(SITE, format!("<!-- copy: {payload} -->\n{block}"));

    assert!(service.replace_local_media_id(&mut post, &uploaded(1, 501)).unwrap());

    // Replace-by-value also rewrites the verbatim copy outside the block.
    assert!(!post.content.contains(&payload));
    assert_eq!(post.content.matches(r#""id":"501""#).count(), 2);
}
