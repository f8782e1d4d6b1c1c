//! Cooldown gate boundary behavior.

use chrono::{Duration, Utc};
use magpie_core::{SyncLogRepository, SyncStatus, UserContext};
use magpie_db::test_fixtures::memory_db;
use magpie_db::Database;
use uuid::Uuid;

/// Insert a finished sync-log row `minutes_ago` minutes in the past.
async fn seed_run(db: &Database, user_id: &str, status: &str, minutes_ago: i64) {
    let finished = Utc::now() - Duration::minutes(minutes_ago);
    sqlx::query(
        "INSERT INTO sync_log (id, user_id, started_at, finished_at, status,
                               fetched_count, new_count, duplicate_count)
         VALUES (?, ?, ?, ?, ?, 10, 8, 2)",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(user_id)
    .bind(finished - Duration::minutes(1))
    .bind(finished)
    .bind(status)
    .execute(&db.pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_no_previous_sync_allows_sync() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");

    let status = db.sync_log.check_cooldown(&ctx).await.unwrap();
    assert!(status.can_sync);
    assert_eq!(status.cooldown_remaining_secs, 0);
    assert!(status.last_sync_at.is_none());
}

#[tokio::test]
async fn test_recent_completion_blocks_sync() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    seed_run(&db, "u1", "completed", 5).await;

    let status = db.sync_log.check_cooldown(&ctx).await.unwrap();
    assert!(!status.can_sync);
    // ~10 minutes of the 15-minute window remain.
    assert!(status.cooldown_remaining_secs > 590 && status.cooldown_remaining_secs <= 600);
    assert!(status.last_sync_at.is_some());
}

#[tokio::test]
async fn test_old_completion_allows_sync() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    seed_run(&db, "u1", "completed", 20).await;

    let status = db.sync_log.check_cooldown(&ctx).await.unwrap();
    assert!(status.can_sync);
    assert_eq!(status.cooldown_remaining_secs, 0);
}

#[tokio::test]
async fn test_exact_boundary_allows_sync() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    // Exactly the window: strictly-greater-than semantics, not inclusive.
    seed_run(&db, "u1", "completed", 15).await;

    let status = db.sync_log.check_cooldown(&ctx).await.unwrap();
    assert!(status.can_sync);
}

#[tokio::test]
async fn test_failed_and_running_runs_do_not_start_the_clock() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    seed_run(&db, "u1", "failed", 1).await;
    seed_run(&db, "u1", "running", 1).await;

    let status = db.sync_log.check_cooldown(&ctx).await.unwrap();
    assert!(status.can_sync);
}

#[tokio::test]
async fn test_cooldown_is_per_user() {
    let db = memory_db().await;
    seed_run(&db, "u1", "completed", 5).await;

    let blocked = db
        .sync_log
        .check_cooldown(&UserContext::new("u1"))
        .await
        .unwrap();
    assert!(!blocked.can_sync);

    let other = db
        .sync_log
        .check_cooldown(&UserContext::new("u2"))
        .await
        .unwrap();
    assert!(other.can_sync);
}

#[tokio::test]
async fn test_run_lifecycle_and_fetch() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");

    let run_id = db.sync_log.begin_run(&ctx).await.unwrap();
    let running = db.sync_log.fetch_run(&ctx, run_id).await.unwrap();
    assert_eq!(running.status, SyncStatus::Running);
    assert!(running.finished_at.is_none());

    db.sync_log
        .complete_run(&ctx, run_id, 50, 45, 5)
        .await
        .unwrap();

    let done = db.sync_log.fetch_run(&ctx, run_id).await.unwrap();
    assert_eq!(done.status, SyncStatus::Completed);
    assert_eq!(done.fetched_count, 50);
    assert_eq!(done.new_count, 45);
    assert_eq!(done.duplicate_count, 5);
    assert!(done.finished_at.is_some());

    // Completing the run starts the cooldown.
    let status = db.sync_log.check_cooldown(&ctx).await.unwrap();
    assert!(!status.can_sync);
}

#[tokio::test]
async fn test_failed_run_records_error() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");

    let run_id = db.sync_log.begin_run(&ctx).await.unwrap();
    db.sync_log
        .fail_run(&ctx, run_id, 10, 3, 1, "upstream 500")
        .await
        .unwrap();

    let failed = db.sync_log.fetch_run(&ctx, run_id).await.unwrap();
    assert_eq!(failed.status, SyncStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("upstream 500"));

    // A failed run never blocks the next attempt.
    assert!(db.sync_log.check_cooldown(&ctx).await.unwrap().can_sync);
}

#[tokio::test]
async fn test_run_scoped_by_user() {
    let db = memory_db().await;
    let ctx = UserContext::new("u1");
    let other = UserContext::new("u2");

    let run_id = db.sync_log.begin_run(&ctx).await.unwrap();
    let err = db.sync_log.fetch_run(&other, run_id).await.unwrap_err();
    assert!(matches!(err, magpie_core::Error::NotFound(_)));
}
