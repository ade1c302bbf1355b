//! Persisted reading progress
//!
//! Progress is keyed by document path, not by record, so every record that
//! points at the same file shares it. The whole table is serialized as one
//! JSON object under [`PROGRESS_STATE_KEY`] and overwritten on every save.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::db::StateRepository;
use crate::error::Result;

/// Fixed key of the progress table in the workspace state
pub const PROGRESS_STATE_KEY: &str = "reader.readingProgress";

/// Saved position in one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    pub current_page: usize,
    pub total_pages: usize,
}

/// Document path to saved position
pub type ProgressMap = BTreeMap<String, SavedProgress>;

/// Durable storage for the progress table
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the whole table; an absent table is empty
    async fn load(&self) -> Result<ProgressMap>;

    /// Replace the whole table
    async fn save(&self, progress: &ProgressMap) -> Result<()>;
}

/// Progress table stored in the SQLite workspace state
#[derive(Clone)]
pub struct SqliteProgressStore {
    pool: SqlitePool,
}

impl SqliteProgressStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn load(&self) -> Result<ProgressMap> {
        let repo = StateRepository::new(&self.pool);
        match repo.get(PROGRESS_STATE_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ProgressMap::new()),
        }
    }

    async fn save(&self, progress: &ProgressMap) -> Result<()> {
        let json = serde_json::to_string(progress)?;
        StateRepository::new(&self.pool)
            .put(PROGRESS_STATE_KEY, &json)
            .await
    }
}

/// In-memory progress table
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    progress: Mutex<ProgressMap>,
    saves: AtomicUsize,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing table
    pub fn with_progress(progress: ProgressMap) -> Self {
        Self {
            progress: Mutex::new(progress),
            saves: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the stored table
    pub async fn snapshot(&self) -> ProgressMap {
        self.progress.lock().await.clone()
    }

    /// Number of saves performed
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self) -> Result<ProgressMap> {
        Ok(self.progress.lock().await.clone())
    }

    async fn save(&self, progress: &ProgressMap) -> Result<()> {
        *self.progress.lock().await = progress.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use tempfile::TempDir;

    #[test]
    fn test_serialized_shape() {
        let mut progress = ProgressMap::new();
        progress.insert(
            "/books/a.txt".to_string(),
            SavedProgress {
                current_page: 3,
                total_pages: 9,
            },
        );

        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(json, r#"{"/books/a.txt":{"currentPage":3,"totalPages":9}}"#);
    }

    #[tokio::test]
    async fn test_sqlite_store_round_trips_table() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("state.db").display());
        let store = SqliteProgressStore::new(create_pool(&url).await.unwrap());

        assert!(store.load().await.unwrap().is_empty());

        let mut progress = ProgressMap::new();
        progress.insert(
            "a.txt".to_string(),
            SavedProgress {
                current_page: 2,
                total_pages: 4,
            },
        );
        store.save(&progress).await.unwrap();

        progress.remove("a.txt");
        progress.insert(
            "b.txt".to_string(),
            SavedProgress {
                current_page: 1,
                total_pages: 1,
            },
        );
        store.save(&progress).await.unwrap();

        // Saves overwrite the whole table
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, progress);
    }

    #[tokio::test]
    async fn test_memory_store_counts_saves() {
        let store = MemoryProgressStore::new();
        store.save(&ProgressMap::new()).await.unwrap();
        store.save(&ProgressMap::new()).await.unwrap();
        assert_eq!(store.save_count(), 2);
    }
}
