//! Document error types
//!
//! Errors raised while locating and reading plain-text documents.

use thiserror::Error;

/// Document loading error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Path does not resolve to a regular file
    #[error("Document not found: {0}")]
    NotFound(String),

    /// File exists but could not be read
    #[error("Document unreadable: {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// Map an IO error for `path` onto the document error kinds
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => DocumentError::NotFound(path.to_string()),
            _ => DocumentError::Unreadable {
                path: path.to_string(),
                source: err,
            },
        }
    }
}

/// Result type alias for document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
