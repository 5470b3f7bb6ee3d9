//! Revoked-token storage.
//!
//! `TokenManager` only talks to the `BlacklistStore` trait. The server wires in
//! `PgBlacklistStore`; tests use `MemoryBlacklistStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::auth::claims::TokenType;
use crate::auth::error::AuthError;

#[derive(Debug, Clone, PartialEq)]
pub struct BlacklistEntry {
    pub jti: String,
    pub token_type: TokenType,
    /// When the revoked token would have expired on its own.
    pub expires_at: DateTime<Utc>,
    pub added_at: DateTime<Utc>,
}

#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Inserts `entry` unless its `jti` is already present.
    /// Returns `false` when the id was already blacklisted.
    async fn insert_if_absent(&self, entry: BlacklistEntry) -> Result<bool, AuthError>;

    /// True when `jti` has an entry that has not yet expired at `now`.
    async fn is_blacklisted(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, AuthError>;

    /// Deletes entries with `expires_at <= now`, returning how many went.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgBlacklistStore {
    pool: PgPool,
}

impl PgBlacklistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistStore for PgBlacklistStore {
    async fn insert_if_absent(&self, entry: BlacklistEntry) -> Result<bool, AuthError> {
        // The unique index on jti makes this a single atomic check-and-insert.
        let result = sqlx::query(
            r#"
            INSERT INTO blacklisted_tokens (jti, token_type, expires_at, added_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(&entry.jti)
        .bind(entry.token_type.as_str())
        .bind(entry.expires_at)
        .bind(entry.added_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_blacklisted(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, AuthError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM blacklisted_tokens WHERE jti = $1 AND expires_at > $2)",
        )
        .bind(jti)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM blacklisted_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[derive(Default)]
pub struct MemoryBlacklistStore {
    entries: parking_lot::Mutex<std::collections::HashMap<String, BlacklistEntry>>,
}

#[cfg(test)]
impl MemoryBlacklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, jti: &str) -> bool {
        self.entries.lock().contains_key(jti)
    }
}

#[cfg(test)]
#[async_trait]
impl BlacklistStore for MemoryBlacklistStore {
    async fn insert_if_absent(&self, entry: BlacklistEntry) -> Result<bool, AuthError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&entry.jti) {
            return Ok(false);
        }
        entries.insert(entry.jti.clone(), entry);
        Ok(true)
    }

    async fn is_blacklisted(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, AuthError> {
        Ok(self
            .entries
            .lock()
            .get(jti)
            .is_some_and(|entry| entry.expires_at > now))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
