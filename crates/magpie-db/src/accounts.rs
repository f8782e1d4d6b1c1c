//! Connected-account and session repository.
//!
//! Stores the result of the OAuth exchange (account + bearer token) and
//! resolves opaque session tokens to a [`UserContext`]. Session tokens
//! are random, shown once, and stored only as SHA-256 digests.

use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Row, Sqlite};

use magpie_core::defaults::SESSION_TOKEN_BYTES;
use magpie_core::{Account, AccountRepository, Error, Result, UserContext};

/// SQLite implementation of AccountRepository.
pub struct SqliteAccountRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAccountRepository {
    /// Create a new SqliteAccountRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn upsert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO account (user_id, handle, access_token, connected_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET
                 handle = excluded.handle,
                 access_token = excluded.access_token,
                 connected_at = excluded.connected_at",
        )
        .bind(&account.user_id)
        .bind(&account.handle)
        .bind(&account.access_token)
        .bind(account.connected_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn fetch(&self, ctx: &UserContext) -> Result<Account> {
        let row = sqlx::query("SELECT * FROM account WHERE user_id = ?")
            .bind(ctx.user_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("account {}", ctx.user_id())))?;

        Ok(Account {
            user_id: row.get("user_id"),
            handle: row.get("handle"),
            access_token: row.get("access_token"),
            connected_at: row.get("connected_at"),
        })
    }

    async fn create_session(&self, ctx: &UserContext) -> Result<String> {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        sqlx::query("INSERT INTO session (token_hash, user_id, created_at) VALUES (?, ?, ?)")
            .bind(Self::hash_token(&token))
            .bind(ctx.user_id())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<UserContext>> {
        let user_id: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM session WHERE token_hash = ?")
                .bind(Self::hash_token(token))
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(user_id.map(UserContext::new))
    }
}
