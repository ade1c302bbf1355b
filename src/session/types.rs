//! Record and session types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque record identity (a commit hash in the history view)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId(id)
    }
}

/// A list record supplied by the record provider
///
/// Immutable identity and display fields only; reading state lives in the
/// session side-table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
    /// Text file read through this record; falls back to the configured path
    #[serde(default)]
    pub document: Option<String>,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        message: impl Into<String>,
        author: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            author: author.into(),
            date,
            document: None,
        }
    }

    /// Point this record at a specific text file
    pub fn with_document(mut self, path: impl Into<String>) -> Self {
        self.document = Some(path.into());
        self
    }
}

/// Reading state attached to one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    /// Document path being read
    pub document: Option<String>,
    pub is_active: bool,
    pub current_page: usize,
    pub total_pages: usize,
    /// Text of the current page
    pub visible_text: String,
    /// Activation ticket this session was opened with
    #[serde(skip)]
    pub generation: u64,
}

impl Default for ReadingSession {
    fn default() -> Self {
        Self {
            document: None,
            is_active: false,
            current_page: 1,
            total_pages: 0,
            visible_text: String::new(),
            generation: 0,
        }
    }
}

impl ReadingSession {
    /// Revert to the inert closed state
    pub fn close(&mut self) {
        *self = Self::default();
    }
}

/// Read-only summary of a record's reading state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStatus {
    pub is_reading: bool,
    pub current_page: usize,
    pub total_pages: usize,
}

/// Result of toggling a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The record was opened at `page`
    Opened { page: usize, total_pages: usize },
    /// The record was already open; `true` if the page advanced
    Advanced(bool),
    /// A later activation or stop was issued before the load resolved
    Superseded,
}

/// Result of a search command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchJump {
    pub hit: crate::search::SearchHit,
    /// Page holding the match
    pub page: usize,
    /// Whether the session moved to `page`
    pub moved: bool,
}
