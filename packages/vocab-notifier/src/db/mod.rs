pub mod config;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod sqlite;

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use crate::db::config::{DbConfig, DbMode};
pub use crate::db::models::{Example, Word};
pub use crate::db::postgres::PgWordStore;
pub use crate::db::sqlite::SqliteWordStore;

/// Read/write surface the daily job needs from the word collection.
pub trait WordStore: Send + Sync {
    /// Unused words (no `lastUsed`), oldest first, at most `limit` of them.
    fn fetch_unused_words(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Word>, StoreError>> + Send;

    fn count_used_words(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Stamps `used_at` on every listed word that is still unused, atomically.
    /// Returns the number of rows that changed.
    fn mark_used(
        &self,
        ids: &[String],
        used_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid database configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Backend chosen at start-up from `DATABASE_URL`.
#[derive(Clone)]
pub enum WordDb {
    Postgres(PgWordStore),
    Sqlite(SqliteWordStore),
}

impl WordDb {
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let db = match config.mode {
            DbMode::Postgres => WordDb::Postgres(PgWordStore::connect(config).await?),
            DbMode::Sqlite => WordDb::Sqlite(SqliteWordStore::connect(config).await?),
        };
        tracing::info!(mode = ?config.mode, "word store connected");
        Ok(db)
    }

    pub async fn close(&self) {
        match self {
            WordDb::Postgres(store) => store.pool().close().await,
            WordDb::Sqlite(store) => store.pool().close().await,
        }
    }
}

impl WordStore for WordDb {
    async fn fetch_unused_words(&self, limit: u32) -> Result<Vec<Word>, StoreError> {
        match self {
            WordDb::Postgres(store) => store.fetch_unused_words(limit).await,
            WordDb::Sqlite(store) => store.fetch_unused_words(limit).await,
        }
    }

    async fn count_used_words(&self) -> Result<u64, StoreError> {
        match self {
            WordDb::Postgres(store) => store.count_used_words().await,
            WordDb::Sqlite(store) => store.count_used_words().await,
        }
    }

    async fn mark_used(&self, ids: &[String], used_at: DateTime<Utc>) -> Result<u64, StoreError> {
        match self {
            WordDb::Postgres(store) => store.mark_used(ids, used_at).await,
            WordDb::Sqlite(store) => store.mark_used(ids, used_at).await,
        }
    }
}
