//! Clone-collection semantics: the 100-item cap and skip counting.

use magpie_core::{BookmarkRepository, Error, IngestSource, TagRepository, UserContext};
use magpie_db::test_fixtures::memory_db;
use magpie_db::Database;
use magpie_fetch::mock::{sample_photo_post, sample_post};

async fn seed_tagged(db: &Database, ctx: &UserContext, count: usize, tag: &str) {
    for i in 0..count {
        let post = sample_post(&format!("{}", 1000 + i));
        db.bookmarks.ingest(ctx, &post, Some(tag)).await.unwrap();
    }
}

#[tokio::test]
async fn test_clone_copies_bookmarks_and_tag() {
    let db = memory_db().await;
    let source = UserContext::new("u1");
    let target = UserContext::new("u2");

    db.bookmarks
        .ingest(&source, &sample_photo_post("100"), Some("rust"))
        .await
        .unwrap();

    let summary = db
        .tags
        .clone_collection(&source, "rust", &target)
        .await
        .unwrap();
    assert_eq!(summary.cloned, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.total, 1);

    let cloned = db.bookmarks.fetch(&target, "100").await.unwrap();
    assert_eq!(cloned.source, IngestSource::Cloned);
    assert_eq!(cloned.tags, vec!["rust".to_string()]);
    assert_eq!(cloned.media.len(), 1);

    // The source copy is untouched.
    let original = db.bookmarks.fetch(&source, "100").await.unwrap();
    assert_eq!(original.source, IngestSource::Sync);
}

#[tokio::test]
async fn test_clone_skips_already_owned_posts() {
    let db = memory_db().await;
    let source = UserContext::new("u1");
    let target = UserContext::new("u2");

    seed_tagged(&db, &source, 3, "rust").await;

    // Target already owns one of them, with their own text.
    let mut owned = sample_post("1001");
    owned.text = "target's own copy".to_string();
    db.bookmarks.ingest(&target, &owned, None).await.unwrap();

    let summary = db
        .tags
        .clone_collection(&source, "rust", &target)
        .await
        .unwrap();
    assert_eq!(summary.cloned, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.total, 3);

    let kept = db.bookmarks.fetch(&target, "1001").await.unwrap();
    assert_eq!(kept.text, "target's own copy");
}

#[tokio::test]
async fn test_clone_at_cap_succeeds() {
    let db = memory_db().await;
    let source = UserContext::new("u1");
    let target = UserContext::new("u2");

    seed_tagged(&db, &source, 100, "big").await;

    let summary = db
        .tags
        .clone_collection(&source, "big", &target)
        .await
        .unwrap();
    assert_eq!(summary.cloned, 100);
    assert_eq!(summary.total, 100);
}

#[tokio::test]
async fn test_clone_over_cap_rejected_with_zero_writes() {
    let db = memory_db().await;
    let source = UserContext::new("u1");
    let target = UserContext::new("u2");

    seed_tagged(&db, &source, 101, "big").await;

    let err = db
        .tags
        .clone_collection(&source, "big", &target)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));

    let listed = db.bookmarks.list(&target, Default::default()).await.unwrap();
    assert_eq!(listed.total, 0);
}

#[tokio::test]
async fn test_clone_unknown_tag_is_empty_summary() {
    let db = memory_db().await;
    let source = UserContext::new("u1");
    let target = UserContext::new("u2");

    let summary = db
        .tags
        .clone_collection(&source, "nothing", &target)
        .await
        .unwrap();
    assert_eq!(summary.cloned, 0);
    assert_eq!(summary.total, 0);
}
