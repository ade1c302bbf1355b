//! Key-value state database operations

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;

/// State repository
pub struct StateRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StateRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the raw value stored under `key`
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_state WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Overwrite the value stored under `key`
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_state (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the value stored under `key`
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_state WHERE key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
