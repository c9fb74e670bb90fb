use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::db::config::DbConfig;
use crate::db::models::{Word, WordRow, WORD_COLUMNS};
use crate::db::schema::{schema_statements, SQLITE_SCHEMA_SQL};
use crate::db::{StoreError, WordStore};

/// Ids bound per `IN (...)` list, well under SQLite's host parameter limit.
const MARK_USED_CHUNK: usize = 500;

#[derive(Clone)]
pub struct SqliteWordStore {
    pool: SqlitePool,
}

impl SqliteWordStore {
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StoreError::Config(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and makes sure the `words` table exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        for stmt in schema_statements(SQLITE_SCHEMA_SQL) {
            sqlx::query(&stmt).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl WordStore for SqliteWordStore {
    async fn fetch_unused_words(&self, limit: u32) -> Result<Vec<Word>, StoreError> {
        let sql = format!(
            r#"
            SELECT {WORD_COLUMNS}
            FROM "words"
            WHERE "lastUsed" IS NULL
            ORDER BY "createdAt" ASC, "id" ASC
            LIMIT ?
            "#
        );
        let rows: Vec<WordRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Word::from).collect())
    }

    async fn count_used_words(&self) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words" WHERE "lastUsed" IS NOT NULL"#)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }

    async fn mark_used(&self, ids: &[String], used_at: DateTime<Utc>) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut updated = 0;
        for chunk in ids.chunks(MARK_USED_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new(r#"UPDATE "words" SET "lastUsed" = "#);
            builder.push_bind(used_at);
            builder.push(r#" WHERE "lastUsed" IS NULL AND "id" IN ("#);
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            updated += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        debug!(requested = ids.len(), updated, "marked words used");
        Ok(updated)
    }
}
