//! Tag normalization, tag listings, read tracking, and list filters.

use magpie_core::{
    BookmarkRepository, ContentCategory, Error, ListBookmarksRequest, ReadStatusRepository,
    TagRepository, UserContext,
};
use magpie_db::test_fixtures::memory_db;
use magpie_fetch::mock::{sample_photo_post, sample_post};

#[tokio::test]
async fn test_tags_are_lowercased_and_capped() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    db.bookmarks
        .ingest(&ctx, &sample_post("100"), None)
        .await
        .unwrap();

    let stored = db.tags.add(&ctx, "100", "RustProgramming").await.unwrap();
    assert_eq!(stored, "rustprogra");

    let bookmark = db.bookmarks.fetch(&ctx, "100").await.unwrap();
    assert_eq!(bookmark.tags, vec!["rustprogra".to_string()]);
}

#[tokio::test]
async fn test_empty_tag_rejected() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    db.bookmarks
        .ingest(&ctx, &sample_post("100"), None)
        .await
        .unwrap();

    let err = db.tags.add(&ctx, "100", "   ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_tagging_missing_bookmark_is_not_found() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    let err = db.tags.add(&ctx, "404", "rust").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_readding_tag_is_noop() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    db.bookmarks
        .ingest(&ctx, &sample_post("100"), None)
        .await
        .unwrap();

    db.tags.add(&ctx, "100", "rust").await.unwrap();
    db.tags.add(&ctx, "100", "RUST").await.unwrap();

    let bookmark = db.bookmarks.fetch(&ctx, "100").await.unwrap();
    assert_eq!(bookmark.tags.len(), 1);
}

#[tokio::test]
async fn test_tag_list_with_counts() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    for id in ["1", "2", "3"] {
        db.bookmarks
            .ingest(&ctx, &sample_post(id), Some("rust"))
            .await
            .unwrap();
    }
    db.tags.add(&ctx, "1", "async").await.unwrap();

    let tags = db.tags.list(&ctx).await.unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].tag, "async");
    assert_eq!(tags[0].bookmark_count, 1);
    assert_eq!(tags[1].tag, "rust");
    assert_eq!(tags[1].bookmark_count, 3);
}

#[tokio::test]
async fn test_remove_tag() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    db.bookmarks
        .ingest(&ctx, &sample_post("100"), Some("rust"))
        .await
        .unwrap();

    db.tags.remove(&ctx, "100", "Rust").await.unwrap();
    let bookmark = db.bookmarks.fetch(&ctx, "100").await.unwrap();
    assert!(bookmark.tags.is_empty());
}

#[tokio::test]
async fn test_read_flag_round_trip() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    db.bookmarks
        .ingest(&ctx, &sample_post("100"), None)
        .await
        .unwrap();

    assert!(!db.read_status.is_read(&ctx, "100").await.unwrap());

    db.read_status.mark_read(&ctx, "100").await.unwrap();
    assert!(db.read_status.is_read(&ctx, "100").await.unwrap());

    // Marking read twice is a no-op, unmarking clears the row.
    db.read_status.mark_read(&ctx, "100").await.unwrap();
    db.read_status.mark_unread(&ctx, "100").await.unwrap();
    assert!(!db.read_status.is_read(&ctx, "100").await.unwrap());
}

#[tokio::test]
async fn test_mark_read_missing_bookmark_is_not_found() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    let err = db.read_status.mark_read(&ctx, "404").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_list_filters_by_tag_category_and_unread() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");

    db.bookmarks
        .ingest(&ctx, &sample_post("1"), Some("rust"))
        .await
        .unwrap();
    db.bookmarks
        .ingest(&ctx, &sample_photo_post("2"), Some("rust"))
        .await
        .unwrap();
    db.bookmarks
        .ingest(&ctx, &sample_post("3"), None)
        .await
        .unwrap();
    db.read_status.mark_read(&ctx, "1").await.unwrap();

    let tagged = db
        .bookmarks
        .list(
            &ctx,
            ListBookmarksRequest {
                tag: Some("rust".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(tagged.total, 2);

    let photos = db
        .bookmarks
        .list(
            &ctx,
            ListBookmarksRequest {
                category: Some(ContentCategory::Photo),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(photos.total, 1);
    assert_eq!(photos.bookmarks[0].post_id, "2");

    let unread = db
        .bookmarks
        .list(
            &ctx,
            ListBookmarksRequest {
                unread: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(unread.total, 2);
    assert!(unread.bookmarks.iter().all(|b| b.post_id != "1"));

    let read = db
        .bookmarks
        .list(
            &ctx,
            ListBookmarksRequest {
                unread: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(read.total, 1);
    assert_eq!(read.bookmarks[0].post_id, "1");
}

#[tokio::test]
async fn test_list_pagination() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    for i in 0..5 {
        db.bookmarks
            .ingest(&ctx, &sample_post(&format!("{}", i)), None)
            .await
            .unwrap();
    }

    let page = db
        .bookmarks
        .list(
            &ctx,
            ListBookmarksRequest {
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.bookmarks.len(), 2);
}
