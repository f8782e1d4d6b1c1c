//! Router-level API tests over an in-memory database and mock sources.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use magpie_api::{build_router, AppState};
use magpie_core::{AccountRepository, UserContext};
use magpie_db::test_fixtures::memory_db;
use magpie_db::Database;
use magpie_fetch::mock::{
    sample_photo_post, sample_post, MockPostSource, MockSavedPostsSource,
};
use magpie_sync::SyncConfig;

struct TestApp {
    app: Router,
    db: Arc<Database>,
}

async fn test_app(post_source: MockPostSource) -> TestApp {
    let db = Arc::new(memory_db().await);
    let state = AppState::new(
        db.clone(),
        Arc::new(post_source),
        Arc::new(MockSavedPostsSource::new()),
        SyncConfig::default(),
    );
    TestApp {
        app: build_router(state),
        db,
    }
}

async fn session_for(db: &Database, user_id: &str) -> String {
    db.accounts
        .create_session(&UserContext::new(user_id))
        .await
        .unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let t = test_app(MockPostSource::new()).await;
    let response = t.app.oneshot(request("GET", "/health", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_session_is_401() {
    let t = test_app(MockPostSource::new()).await;
    let response = t
        .app
        .oneshot(request("GET", "/bookmarks", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("bearer"));
}

#[tokio::test]
async fn test_invalid_session_is_401() {
    let t = test_app(MockPostSource::new()).await;
    let response = t
        .app
        .oneshot(request("GET", "/bookmarks", Some("bogus"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_bookmark_then_duplicate() {
    let t = test_app(MockPostSource::new().with_post(sample_photo_post("42"))).await;
    let token = session_for(&t.db, "u1").await;

    let body = json!({"author": "alice", "post_id": "42", "tag": "Pics"});
    let response = t
        .app
        .clone()
        .oneshot(request("POST", "/bookmarks", Some(&token), Some(body.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["duplicate"], false);
    assert_eq!(created["bookmark"]["category"], "photo");
    assert_eq!(created["bookmark"]["tags"][0], "pics");
    assert_eq!(created["bookmark"]["media"][0]["media_type"], "photo");

    // Same post again: 200 with the duplicate flag, stored row untouched.
    let response = t
        .app
        .oneshot(request("POST", "/bookmarks", Some(&token), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let duplicate = json_body(response).await;
    assert_eq!(duplicate["duplicate"], true);
}

#[tokio::test]
async fn test_add_bookmark_by_url() {
    let t = test_app(MockPostSource::new().with_post(sample_post("42"))).await;
    let token = session_for(&t.db, "u1").await;

    let body = json!({"url": "https://x.com/alice/status/42"});
    let response = t
        .app
        .oneshot(request("POST", "/bookmarks", Some(&token), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["bookmark"]["source"], "url_prefix");
}

#[tokio::test]
async fn test_add_bookmark_requires_target() {
    let t = test_app(MockPostSource::new()).await;
    let token = session_for(&t.db, "u1").await;

    let response = t
        .app
        .oneshot(request(
            "POST",
            "/bookmarks",
            Some(&token),
            Some(json!({"author": "alice"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_unknown_post_is_404() {
    let t = test_app(MockPostSource::new()).await;
    let token = session_for(&t.db, "u1").await;

    let response = t
        .app
        .oneshot(request(
            "POST",
            "/bookmarks",
            Some(&token),
            Some(json!({"author": "alice", "post_id": "404"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_category_filter_is_400() {
    let t = test_app(MockPostSource::new()).await;
    let token = session_for(&t.db, "u1").await;

    let response = t
        .app
        .oneshot(request("GET", "/bookmarks?category=gif", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tag_and_read_flow() {
    let t = test_app(MockPostSource::new().with_post(sample_post("42"))).await;
    let token = session_for(&t.db, "u1").await;

    t.app
        .clone()
        .oneshot(request(
            "POST",
            "/bookmarks",
            Some(&token),
            Some(json!({"author": "alice", "post_id": "42"})),
        ))
        .await
        .unwrap();

    let response = t
        .app
        .clone()
        .oneshot(request(
            "POST",
            "/bookmarks/42/tags",
            Some(&token),
            Some(json!({"tag": "VeryLongTagName"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let tagged = json_body(response).await;
    assert_eq!(tagged["tag"], "verylongta");

    let response = t
        .app
        .clone()
        .oneshot(request("PUT", "/bookmarks/42/read", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = t
        .app
        .clone()
        .oneshot(request("GET", "/bookmarks/42", Some(&token), None))
        .await
        .unwrap();
    let bookmark = json_body(response).await;
    assert_eq!(bookmark["read"], true);
    assert_eq!(bookmark["tags"][0], "verylongta");

    let response = t
        .app
        .oneshot(request("GET", "/tags", Some(&token), None))
        .await
        .unwrap();
    let tags = json_body(response).await;
    assert_eq!(tags["tags"][0]["tag"], "verylongta");
    assert_eq!(tags["tags"][0]["bookmark_count"], 1);
}

#[tokio::test]
async fn test_share_public_listing_and_clone() {
    let t = test_app(MockPostSource::new().with_post(sample_post("42"))).await;
    let owner_token = session_for(&t.db, "u1").await;
    let other_token = session_for(&t.db, "u2").await;

    t.app
        .clone()
        .oneshot(request(
            "POST",
            "/bookmarks",
            Some(&owner_token),
            Some(json!({"author": "alice", "post_id": "42", "tag": "rust"})),
        ))
        .await
        .unwrap();

    let response = t
        .app
        .clone()
        .oneshot(request("POST", "/tags/rust/share", Some(&owner_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let share = json_body(response).await;
    let share_id = share["id"].as_str().unwrap().to_string();

    // Public view requires no session.
    let response = t
        .app
        .clone()
        .oneshot(request("GET", &format!("/shares/{}", share_id), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(response).await;
    assert_eq!(listing["tag"], "rust");
    assert_eq!(listing["total"], 1);

    // Clone into the other user's account.
    let response = t
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/shares/{}/clone", share_id),
            Some(&other_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["cloned"], 1);
    assert_eq!(summary["skipped"], 0);

    let response = t
        .app
        .oneshot(request("GET", "/bookmarks/42", Some(&other_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cloned = json_body(response).await;
    assert_eq!(cloned["source"], "cloned");
}

#[tokio::test]
async fn test_unknown_share_is_404() {
    let t = test_app(MockPostSource::new()).await;
    let response = t
        .app
        .oneshot(request("GET", "/shares/not-a-uuid", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_status_reports_cooldown() {
    let t = test_app(MockPostSource::new()).await;
    let token = session_for(&t.db, "u1").await;

    let response = t
        .app
        .oneshot(request("GET", "/sync/status", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = json_body(response).await;
    assert_eq!(status["can_sync"], true);
    assert_eq!(status["cooldown_remaining_secs"], 0);
}

#[tokio::test]
async fn test_delete_bookmark() {
    let t = test_app(MockPostSource::new().with_post(sample_post("42"))).await;
    let token = session_for(&t.db, "u1").await;

    t.app
        .clone()
        .oneshot(request(
            "POST",
            "/bookmarks",
            Some(&token),
            Some(json!({"author": "alice", "post_id": "42"})),
        ))
        .await
        .unwrap();

    let response = t
        .app
        .clone()
        .oneshot(request("DELETE", "/bookmarks/42", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = t
        .app
        .oneshot(request("GET", "/bookmarks/42", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
