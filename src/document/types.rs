//! Document types
//!
//! Decoded documents and cache bookkeeping types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decode::Decoded;

/// A decoded plain-text document
///
/// Immutable once loaded; shared by every record that points at the same
/// path.
#[derive(Debug, Clone)]
pub struct Document {
    /// Storage path (cache key)
    pub path: String,
    /// Decoded text
    pub text: String,
    /// Size of the raw file in bytes
    pub byte_len: usize,
    /// Length of the decoded text in chars
    pub char_len: usize,
    /// Name of the encoding used to decode the file
    pub encoding: &'static str,
    /// Lossy UTF-8 fallback was used
    pub degraded: bool,
    /// When the document was decoded
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    /// Build a document from raw bytes already decoded
    pub fn new(path: impl Into<String>, byte_len: usize, decoded: Decoded) -> Self {
        let char_len = decoded.text.chars().count();
        Self {
            path: path.into(),
            text: decoded.text,
            byte_len,
            char_len,
            encoding: decoded.encoding.name(),
            degraded: decoded.degraded,
            loaded_at: Utc::now(),
        }
    }

    /// Number of lines, counting a trailing empty line after a final newline
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Size and line count of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub size: usize,
    pub lines: usize,
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of live or not-yet-purged entries
    pub entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Maximum age of a servable entry
    pub ttl: Duration,
}
