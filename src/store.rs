//! Key/value persistence for the roster and criteria overrides.
//!
//! Values are stored as JSON text in a single SQLite table. Reads never fail:
//! a missing key, an unparseable value or an unreachable database all yield
//! the caller's default.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::error::StoreError;

pub const ROSTER_KEY: &str = "mesEleves";
pub const CRITERIA_KEY: &str = "mesCriteres";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opening never fails. When the database cannot be reached, reads fall
    /// back to their defaults and writes report the failure.
    pub async fn open(path: &Path) -> Self {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.ok();
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);
        let store = Self { pool };

        match store.create_schema().await {
            Ok(()) => tracing::debug!(path = %path.display(), "store opened"),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "store unavailable, stored edits will be ignored"
            ),
        }
        store
    }

    async fn create_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the value stored under `key`, or `default` when there is none
    /// or it cannot be read.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.read_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "no stored value, using default");
                return default;
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read from the store, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "stored value is not valid, using default");
                default
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let result = self.write(key, value).await;
        match &result {
            Ok(()) => tracing::info!(key, "saved to the store"),
            Err(err) => tracing::error!(key, error = %err, "failed to save to the store"),
        }
        result
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;

        sqlx::query(
            r#"
            INSERT INTO entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn put_raw(&self, key: &str, raw: &str) {
        sqlx::query("INSERT OR REPLACE INTO entries (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(raw)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .unwrap();
    }
}
