//! Plain-text document loading
//!
//! Reads raw bytes through a [`DocumentSource`], decodes them with an
//! ordered encoding fallback list and caches the decoded [`Document`].

mod cache;
mod decode;
mod error;
mod traits;
mod types;

pub use cache::{CacheConfig, ContentCache};
pub use decode::{decode, Decoded, CANDIDATE_ENCODINGS};
pub use error::{DocumentError, DocumentResult};
pub use traits::{DocumentSource, FsSource, MemorySource};
pub use types::{CacheStats, Document, FileStats};
