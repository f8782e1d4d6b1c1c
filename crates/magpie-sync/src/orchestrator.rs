//! Sync orchestrator: cooldown gate, pagination loop, progress events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use magpie_core::defaults::{SYNC_PAGE_CAP, SYNC_PAGE_DELAY_MS};
use magpie_core::{
    AccountRepository, BookmarkRepository, Error, Result, SavedPostsSource, SyncEvent,
    SyncLogRepository, UserContext,
};
use magpie_db::{
    Database, SqliteAccountRepository, SqliteBookmarkRepository, SqliteSyncLogRepository,
};

/// Configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum pages fetched per run.
    pub page_cap: u32,
    /// Delay between page fetches.
    pub page_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_cap: SYNC_PAGE_CAP,
            page_delay: Duration::from_millis(SYNC_PAGE_DELAY_MS),
        }
    }
}

impl SyncConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MAGPIE_SYNC_PAGE_CAP` | `20` | Max pages per run |
    /// | `MAGPIE_SYNC_PAGE_DELAY_MS` | `1000` | Delay between pages |
    pub fn from_env() -> Self {
        let page_cap = std::env::var("MAGPIE_SYNC_PAGE_CAP")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(SYNC_PAGE_CAP)
            .max(1);

        let page_delay_ms = std::env::var("MAGPIE_SYNC_PAGE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(SYNC_PAGE_DELAY_MS);

        Self {
            page_cap,
            page_delay: Duration::from_millis(page_delay_ms),
        }
    }

    /// Set the page cap.
    pub fn with_page_cap(mut self, cap: u32) -> Self {
        self.page_cap = cap.max(1);
        self
    }

    /// Set the inter-page delay.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

/// Final counts of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub fetched: i64,
    pub new: i64,
    pub duplicates: i64,
    /// Posts whose normalize/persist failed and were skipped.
    pub failed: i64,
}

/// Drives a full import of one user's saved-posts list.
pub struct SyncOrchestrator {
    source: Arc<dyn SavedPostsSource>,
    bookmarks: Arc<dyn BookmarkRepository>,
    accounts: Arc<dyn AccountRepository>,
    sync_log: Arc<dyn SyncLogRepository>,
    config: SyncConfig,
}

impl SyncOrchestrator {
    /// Create an orchestrator over the given database.
    pub fn new(db: &Database, source: Arc<dyn SavedPostsSource>, config: SyncConfig) -> Self {
        Self::from_parts(
            source,
            Arc::new(SqliteBookmarkRepository::new(db.pool.clone())),
            Arc::new(SqliteAccountRepository::new(db.pool.clone())),
            Arc::new(SqliteSyncLogRepository::new(db.pool.clone())),
            config,
        )
    }

    /// Create an orchestrator from explicit repository handles.
    pub fn from_parts(
        source: Arc<dyn SavedPostsSource>,
        bookmarks: Arc<dyn BookmarkRepository>,
        accounts: Arc<dyn AccountRepository>,
        sync_log: Arc<dyn SyncLogRepository>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            bookmarks,
            accounts,
            sync_log,
            config,
        }
    }

    /// Run a full sync for one user, pushing ordered progress events
    /// into `events`.
    ///
    /// The receiver dropping is the cancellation signal: it is observed
    /// at each page boundary and halts the pagination loop, finalizing
    /// the run as failed. A single post's persist failure is logged and
    /// skipped; a page-fetch failure aborts the whole run.
    #[instrument(skip(self, ctx, events), fields(user_id = ctx.user_id()))]
    pub async fn run(
        &self,
        ctx: &UserContext,
        events: mpsc::Sender<SyncEvent>,
    ) -> Result<SyncReport> {
        let start = Instant::now();

        // Cooldown gate: only a successful completion starts the clock.
        let cooldown = self.sync_log.check_cooldown(ctx).await?;
        if !cooldown.can_sync {
            let message = format!(
                "sync cooldown active, retry in {}s",
                cooldown.cooldown_remaining_secs
            );
            let _ = events.send(SyncEvent::Error { message: message.clone() }).await;
            return Err(Error::LimitExceeded(message));
        }

        let account = match self.accounts.fetch(ctx).await {
            Ok(account) => account,
            Err(e) => {
                let _ = events
                    .send(SyncEvent::Error {
                        message: "no connected account".to_string(),
                    })
                    .await;
                return Err(e);
            }
        };

        let run_id = self.sync_log.begin_run(ctx).await?;
        let _ = events.send(SyncEvent::Started { run_id }).await;

        let mut fetched = 0i64;
        let mut new = 0i64;
        let mut duplicates = 0i64;
        let mut failed = 0i64;
        let mut processed = 0usize;
        let mut cursor: Option<String> = None;

        for page in 1..=self.config.page_cap {
            // Page-boundary cancellation check: a dropped receiver means
            // the client went away, so stop paging upstream.
            if events.is_closed() {
                warn!(run_id = %run_id, page, "Sync cancelled, receiver dropped");
                self.sync_log
                    .fail_run(ctx, run_id, fetched, new, duplicates, "cancelled by client")
                    .await?;
                return Err(Error::Internal("sync cancelled".to_string()));
            }

            let result = self
                .source
                .saved_posts_page(ctx.user_id(), &account.access_token, cursor.as_deref())
                .await;

            let page_posts = match result {
                Ok(page_posts) => page_posts,
                Err(e) => {
                    // Fetch-level failure aborts the run. Fail-fast.
                    warn!(run_id = %run_id, page, error = %e, "Page fetch failed, aborting sync");
                    self.sync_log
                        .fail_run(ctx, run_id, fetched, new, duplicates, &e.to_string())
                        .await?;
                    let _ = events
                        .send(SyncEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return Err(e);
                }
            };

            fetched += page_posts.posts.len() as i64;
            let _ = events
                .send(SyncEvent::Page {
                    page,
                    count: page_posts.posts.len(),
                })
                .await;

            for post in &page_posts.posts {
                processed += 1;
                match self.bookmarks.ingest(ctx, post, None).await {
                    Ok(outcome) => {
                        if outcome.created {
                            new += 1;
                        } else {
                            duplicates += 1;
                        }
                        let _ = events
                            .send(SyncEvent::Processing {
                                post_id: post.post_id.clone(),
                                created: outcome.created,
                                processed,
                            })
                            .await;
                    }
                    // One bad post never aborts the remaining pagination.
                    Err(e) => {
                        failed += 1;
                        warn!(
                            run_id = %run_id,
                            post_id = %post.post_id,
                            error = %e,
                            "Skipping post that failed to persist"
                        );
                    }
                }
            }

            cursor = page_posts.next_cursor;
            if cursor.is_none() {
                break;
            }
            if page == self.config.page_cap {
                warn!(run_id = %run_id, page_cap = self.config.page_cap, "Page cap reached with cursor remaining");
                break;
            }
            sleep(self.config.page_delay).await;
        }

        self.sync_log
            .complete_run(ctx, run_id, fetched, new, duplicates)
            .await?;
        let _ = events
            .send(SyncEvent::Completed {
                run_id,
                fetched,
                new,
                duplicates,
            })
            .await;

        info!(
            subsystem = "sync",
            op = "run",
            run_id = %run_id,
            fetched,
            new,
            duplicates,
            failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Sync completed"
        );

        Ok(SyncReport {
            run_id,
            fetched,
            new,
            duplicates,
            failed,
        })
    }
}
