//! Decoded document cache with TTL and bounded capacity
//!
//! Entries are evicted in insertion order: reads use `peek` so they never
//! refresh an entry's position. Expired entries are never served and are
//! purged before every insertion.
//!
//! # Thread Safety
//!
//! The table sits behind a `tokio::sync::RwLock`; documents are shared as
//! `Arc<Document>`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use super::decode::decode;
use super::{CacheStats, Document, DocumentResult, DocumentSource, FileStats};

/// Default maximum age of a cache entry
const DEFAULT_TTL_SECS: u64 = 5 * 60;
/// Default maximum number of cached documents
const DEFAULT_MAX_ENTRIES: usize = 10;

/// Cache configuration options
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum age of a servable entry
    pub ttl: Duration,
    /// Maximum number of cached documents
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

struct CacheEntry {
    document: Arc<Document>,
    inserted_at: Instant,
}

/// Content cache in front of a [`DocumentSource`]
#[derive(Clone)]
pub struct ContentCache {
    source: Arc<dyn DocumentSource>,
    entries: Arc<RwLock<LruCache<String, CacheEntry>>>,
    config: CacheConfig,
}

impl ContentCache {
    /// Create a new cache reading through `source`
    pub fn new(source: Arc<dyn DocumentSource>, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            source,
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
            config: CacheConfig {
                max_entries: capacity.get(),
                ..config
            },
        }
    }

    /// Load a document, serving a live cache entry when there is one
    pub async fn load(&self, path: &str) -> DocumentResult<Arc<Document>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.peek(path) {
                if entry.inserted_at.elapsed() < self.config.ttl {
                    tracing::trace!(path, "Document cache hit");
                    return Ok(entry.document.clone());
                }
            }
        }

        let bytes = self.source.read(path).await?;

        let decoded = decode(&bytes);
        if decoded.degraded {
            tracing::warn!(path, "No candidate encoding matched, decoded as lossy UTF-8");
        }

        let document = Arc::new(Document::new(path, bytes.len(), decoded));
        tracing::debug!(
            path,
            encoding = document.encoding,
            bytes = document.byte_len,
            chars = document.char_len,
            "Loaded document"
        );

        self.insert(path, document.clone()).await;
        Ok(document)
    }

    /// Load a document and return a copy of its text
    pub async fn load_text(&self, path: &str) -> DocumentResult<String> {
        Ok(self.load(path).await?.text.clone())
    }

    async fn insert(&self, path: &str, document: Arc<Document>) {
        let mut entries = self.entries.write().await;

        let ttl = self.config.ttl;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.inserted_at.elapsed() >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            entries.pop(&key);
        }

        if !entries.contains(path) && entries.len() >= self.config.max_entries {
            if let Some((evicted, _)) = entries.pop_lru() {
                tracing::debug!(path = %evicted, "Evicted oldest cached document");
            }
        }

        entries.put(
            path.to_string(),
            CacheEntry {
                document,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Byte size and line count of a document
    pub async fn file_stats(&self, path: &str) -> DocumentResult<FileStats> {
        let document = self.load(path).await?;
        Ok(FileStats {
            size: document.byte_len,
            lines: document.line_count(),
        })
    }

    /// Check that `path` is an existing regular file. Never fails.
    pub async fn is_readable(&self, path: &str) -> bool {
        self.source.is_readable(path).await
    }

    /// Drop a single document from the cache
    pub async fn invalidate(&self, path: &str) {
        let mut entries = self.entries.write().await;
        entries.pop(path);
    }

    /// Clear the entire cache
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Check if a document is cached (expired or not)
    pub async fn contains(&self, path: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains(path)
    }

    /// Get the number of cached documents
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        let entries = self.entries.read().await;
        entries.is_empty()
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            entries: entries.len(),
            capacity: self.config.max_entries,
            ttl: self.config.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentError, MemorySource};

    async fn cache_with(files: &[(&str, &str)], config: CacheConfig) -> (ContentCache, Arc<MemorySource>) {
        let source = Arc::new(MemorySource::new());
        for (path, text) in files {
            source.insert(*path, *text).await;
        }
        (ContentCache::new(source.clone(), config), source)
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_cache() {
        let (cache, source) = cache_with(&[("a.txt", "hello")], CacheConfig::default()).await;

        let first = cache.load_text("a.txt").await.unwrap();
        let second = cache.load_text("a.txt").await.unwrap();

        assert_eq!(first, "hello");
        assert_eq!(first, second);
        assert_eq!(source.read_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_reloaded() {
        let (cache, source) = cache_with(&[("a.txt", "v1")], CacheConfig::default()).await;

        assert_eq!(cache.load_text("a.txt").await.unwrap(), "v1");
        source.insert("a.txt", "v2").await;

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.load_text("a.txt").await.unwrap(), "v1");

        tokio::time::advance(Duration::from_secs(DEFAULT_TTL_SECS)).await;
        assert_eq!(cache.load_text("a.txt").await.unwrap(), "v2");
        assert_eq!(source.read_count(), 2);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_inserted() {
        let files: Vec<(String, String)> = (0..11)
            .map(|i| (format!("{i}.txt"), format!("doc {i}")))
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, t)| (p.as_str(), t.as_str()))
            .collect();
        let (cache, _source) = cache_with(&borrowed, CacheConfig::default()).await;

        for i in 0..10 {
            cache.load(&format!("{i}.txt")).await.unwrap();
        }
        // Reading the oldest entry again must not protect it
        cache.load("0.txt").await.unwrap();
        assert_eq!(cache.len().await, 10);

        cache.load("10.txt").await.unwrap();

        assert_eq!(cache.len().await, 10);
        assert!(!cache.contains("0.txt").await);
        for i in 1..=10 {
            assert!(cache.contains(&format!("{i}.txt")).await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_purged_before_eviction() {
        let config = CacheConfig {
            ttl: Duration::from_secs(10),
            max_entries: 2,
        };
        let (cache, _source) =
            cache_with(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")], config).await;

        cache.load("a.txt").await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.load("b.txt").await.unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;

        // a.txt has expired and is purged, so b.txt survives
        cache.load("c.txt").await.unwrap();
        assert!(!cache.contains("a.txt").await);
        assert!(cache.contains("b.txt").await);
        assert!(cache.contains("c.txt").await);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let (cache, _source) = cache_with(&[], CacheConfig::default()).await;

        assert!(!cache.is_readable("nope.txt").await);
        assert!(matches!(
            cache.load("nope.txt").await,
            Err(DocumentError::NotFound(_))
        ));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_stats() {
        let (cache, _source) = cache_with(&[("a.txt", "one\ntwo\nthree")], CacheConfig::default()).await;

        let stats = cache.file_stats("a.txt").await.unwrap();
        assert_eq!(stats, FileStats { size: 13, lines: 3 });
    }

    #[tokio::test]
    async fn test_clear_and_invalidate() {
        let (cache, source) =
            cache_with(&[("a.txt", "a"), ("b.txt", "b")], CacheConfig::default()).await;

        cache.load("a.txt").await.unwrap();
        cache.load("b.txt").await.unwrap();

        cache.invalidate("a.txt").await;
        assert!(!cache.contains("a.txt").await);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);

        cache.load("b.txt").await.unwrap();
        assert_eq!(source.read_count(), 3);
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let config = CacheConfig {
            ttl: Duration::from_secs(30),
            max_entries: 0,
        };
        let (cache, _source) = cache_with(&[], config).await;
        let stats = cache.stats().await;

        assert_eq!(stats.entries, 0);
        assert_eq!(stats.capacity, 1);
        assert_eq!(stats.ttl, Duration::from_secs(30));
    }
}
