//! Sync-log repository and the cooldown gate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::info;
use uuid::Uuid;

use magpie_core::defaults::SYNC_COOLDOWN_SECS;
use magpie_core::{
    CooldownStatus, Error, Result, SyncLogRepository, SyncRun, SyncStatus, UserContext,
};

/// SQLite implementation of SyncLogRepository.
pub struct SqliteSyncLogRepository {
    pool: Pool<Sqlite>,
}

impl SqliteSyncLogRepository {
    /// Create a new SqliteSyncLogRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn finalize(
        &self,
        ctx: &UserContext,
        run_id: Uuid,
        status: SyncStatus,
        fetched: i64,
        new: i64,
        duplicates: i64,
        error: Option<&str>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE sync_log
             SET finished_at = ?, status = ?, fetched_count = ?, new_count = ?,
                 duplicate_count = ?, error = ?
             WHERE user_id = ? AND id = ?",
        )
        .bind(Utc::now())
        .bind(status.as_str())
        .bind(fetched)
        .bind(new)
        .bind(duplicates)
        .bind(error)
        .bind(ctx.user_id())
        .bind(run_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("sync run {}", run_id)));
        }
        Ok(())
    }
}

fn map_run(row: &SqliteRow) -> Result<SyncRun> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("malformed sync run id: {}", e)))?;
    Ok(SyncRun {
        id,
        started_at: row.get("started_at"),
        finished_at: row.get::<Option<DateTime<Utc>>, _>("finished_at"),
        status: SyncStatus::parse(row.get::<String, _>("status").as_str()),
        fetched_count: row.get("fetched_count"),
        new_count: row.get("new_count"),
        duplicate_count: row.get("duplicate_count"),
        error: row.get("error"),
    })
}

#[async_trait]
impl SyncLogRepository for SqliteSyncLogRepository {
    async fn begin_run(&self, ctx: &UserContext) -> Result<Uuid> {
        let run_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO sync_log (id, user_id, started_at, status)
             VALUES (?, ?, ?, 'running')",
        )
        .bind(run_id.to_string())
        .bind(ctx.user_id())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            op = "begin_run",
            user_id = ctx.user_id(),
            run_id = %run_id,
            "Sync run started"
        );
        Ok(run_id)
    }

    async fn complete_run(
        &self,
        ctx: &UserContext,
        run_id: Uuid,
        fetched: i64,
        new: i64,
        duplicates: i64,
    ) -> Result<()> {
        self.finalize(
            ctx,
            run_id,
            SyncStatus::Completed,
            fetched,
            new,
            duplicates,
            None,
        )
        .await
    }

    async fn fail_run(
        &self,
        ctx: &UserContext,
        run_id: Uuid,
        fetched: i64,
        new: i64,
        duplicates: i64,
        error: &str,
    ) -> Result<()> {
        self.finalize(
            ctx,
            run_id,
            SyncStatus::Failed,
            fetched,
            new,
            duplicates,
            Some(error),
        )
        .await
    }

    async fn last_completed(&self, ctx: &UserContext) -> Result<Option<SyncRun>> {
        let row = sqlx::query(
            "SELECT * FROM sync_log
             WHERE user_id = ? AND status = 'completed'
             ORDER BY finished_at DESC
             LIMIT 1",
        )
        .bind(ctx.user_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_run).transpose()
    }

    async fn check_cooldown(&self, ctx: &UserContext) -> Result<CooldownStatus> {
        // Only a successful completion starts the clock; running and
        // failed rows are ignored here.
        let last = self.last_completed(ctx).await?;

        let (can_sync, remaining, last_sync_at) = match last.and_then(|run| run.finished_at) {
            Some(finished_at) => {
                let elapsed = (Utc::now() - finished_at).num_seconds();
                let remaining = (SYNC_COOLDOWN_SECS - elapsed).max(0);
                (remaining == 0, remaining, Some(finished_at))
            }
            None => (true, 0, None),
        };

        Ok(CooldownStatus {
            can_sync,
            cooldown_remaining_secs: remaining,
            last_sync_at,
        })
    }

    async fn fetch_run(&self, ctx: &UserContext, run_id: Uuid) -> Result<SyncRun> {
        let row = sqlx::query("SELECT * FROM sync_log WHERE user_id = ? AND id = ?")
            .bind(ctx.user_id())
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("sync run {}", run_id)))?;
        map_run(&row)
    }
}
