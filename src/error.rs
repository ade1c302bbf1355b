//! Error types for the reader engine

use thiserror::Error;

use crate::document::DocumentError;

/// Engine-wide result type
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Reader error type
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("No text file configured for record {0}")]
    NoDocument(String),

    #[error("Record {0} is not being read")]
    NotReading(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReaderError {
    /// Short message suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            ReaderError::Document(DocumentError::NotFound(path)) => {
                format!("Text file does not exist or cannot be read: {}", path)
            }
            ReaderError::Document(_) => "Failed to read text file".to_string(),
            ReaderError::NoDocument(_) => {
                "No text file configured, set a text file path first".to_string()
            }
            ReaderError::NotReading(_) => "Select a record that is being read first".to_string(),
            ReaderError::EmptyQuery => "Enter something to search for".to_string(),
            other => other.to_string(),
        }
    }
}
