use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::db::config::DbConfig;
use crate::db::models::{Word, WordRow, WORD_COLUMNS};
use crate::db::schema::{schema_statements, POSTGRES_SCHEMA_SQL};
use crate::db::{StoreError, WordStore};

#[derive(Clone)]
pub struct PgWordStore {
    pool: PgPool,
}

impl PgWordStore {
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, StoreError> {
        for stmt in schema_statements(POSTGRES_SCHEMA_SQL) {
            sqlx::query(&stmt).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl WordStore for PgWordStore {
    async fn fetch_unused_words(&self, limit: u32) -> Result<Vec<Word>, StoreError> {
        let sql = format!(
            r#"
            SELECT {WORD_COLUMNS}
            FROM "words"
            WHERE "lastUsed" IS NULL
            ORDER BY "createdAt" ASC, "id" ASC
            LIMIT $1
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

        let result = sqlx::query(
            r#"
            UPDATE "words"
            SET "lastUsed" = $1
            WHERE "id" = ANY($2) AND "lastUsed" IS NULL
            "#,
        )
        .bind(used_at)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        debug!(requested = ids.len(), updated = result.rows_affected(), "marked words used");
        Ok(result.rows_affected())
    }
}
