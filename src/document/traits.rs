//! Document traits
//!
//! Storage-agnostic access to raw document bytes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{DocumentError, DocumentResult};

/// Backing storage for plain-text documents
///
/// Implementations resolve a path key to raw bytes. Decoding and caching
/// happen above this layer in [`super::ContentCache`].
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Read the full contents of `path`
    async fn read(&self, path: &str) -> DocumentResult<Vec<u8>>;

    /// Check that `path` exists and is a regular file. Never fails.
    async fn is_readable(&self, path: &str) -> bool;
}

/// Local filesystem source
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[async_trait]
impl DocumentSource for FsSource {
    async fn read(&self, path: &str) -> DocumentResult<Vec<u8>> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| DocumentError::from_io(path, e))?;

        if !metadata.is_file() {
            return Err(DocumentError::NotFound(path.to_string()));
        }

        tokio::fs::read(path)
            .await
            .map_err(|e| DocumentError::from_io(path, e))
    }

    async fn is_readable(&self, path: &str) -> bool {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.is_file(),
            Err(_) => false,
        }
    }
}

/// In-memory source keyed by path
///
/// Counts reads so callers can observe cache hits.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub async fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let mut files = self.files.write().await;
        files.insert(path.into(), bytes.into());
    }

    /// Remove a document
    pub async fn remove(&self, path: &str) {
        let mut files = self.files.write().await;
        files.remove(path);
    }

    /// Number of successful reads served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn read(&self, path: &str) -> DocumentResult<Vec<u8>> {
        let files = self.files.read().await;
        let bytes = files
            .get(path)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(path.to_string()))?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }

    async fn is_readable(&self, path: &str) -> bool {
        let files = self.files.read().await;
        files.contains_key(path)
    }
}
