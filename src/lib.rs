//! Covert Reader
//!
//! A paginated plain-text reader disguised as a commit-history list. Any
//! record can be switched into reading mode, where its label shows one page
//! of a text file instead of a commit message.
//!
//! # Modules
//!
//! - `document`: Byte sources, encoding detection and the content cache
//! - `pagination`: Fixed-size character pages
//! - `search`: Per-document occurrence lists with a cyclic cursor
//! - `session`: The reading state machine, progress persistence and views
//! - `config` / `db`: Environment settings and the SQLite state store

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod pagination;
pub mod search;
pub mod session;

pub use error::{ReaderError, Result};
