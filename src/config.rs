//! Configuration management for Covert Reader

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::document::CacheConfig;
use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub reader: ReaderConfig,
    pub cache: CacheSettings,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    /// Text file shown by records that carry no path of their own
    pub txt_file_path: Option<String>,
    /// Characters per page
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Error raised when an environment variable holds an unparsable value
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Result of [`Config::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValidation {
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reader: ReaderConfig {
                txt_file_path: None,
                page_size: DEFAULT_PAGE_SIZE,
            },
            cache: CacheSettings {
                ttl_secs: 300,
                max_entries: 10,
            },
            database: DatabaseConfig {
                url: "sqlite:./reader-state.db".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            reader: ReaderConfig {
                txt_file_path: env::var("READER_TXT_FILE_PATH")
                    .ok()
                    .filter(|p| !p.trim().is_empty()),
                page_size: parse_var("READER_PAGE_SIZE", defaults.reader.page_size)?,
            },
            cache: CacheSettings {
                ttl_secs: parse_var("READER_CACHE_TTL_SECS", defaults.cache.ttl_secs)?,
                max_entries: parse_var("READER_CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
        })
    }

    /// Check the reader settings, collecting every problem found
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();

        match self.reader.txt_file_path.as_deref() {
            None => errors.push("No text file path configured".to_string()),
            Some(path) if !Path::new(path).is_file() => {
                errors.push(format!("Text file does not exist: {}", path))
            }
            Some(_) => {}
        }

        errors.extend(check_page_size(self.reader.page_size));

        ConfigValidation { errors }
    }

    /// Cache options derived from these settings
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_entries: self.cache.max_entries,
        }
    }
}

/// Problem with a page size, if any
pub fn check_page_size(page_size: usize) -> Option<String> {
    if page_size == 0 {
        Some("Page size must be greater than 0".to_string())
    } else if page_size > MAX_PAGE_SIZE {
        Some(format!("Page size must not exceed {}", MAX_PAGE_SIZE))
    } else {
        None
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
        Err(_) => Ok(default),
    }
}
