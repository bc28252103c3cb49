//! Shelfmark: an incremental index for static HTML pages on disk
//!
//! This crate walks a content root, extracts title/description/keyword
//! metadata from every page it recognizes, and keeps a SQLite index of that
//! metadata in sync through periodic fingerprint-gated re-scans. The index is
//! searched concurrently with crawling.

pub mod config;
pub mod crawler;
pub mod output;
pub mod query;
pub mod server;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Shelfmark operations
#[derive(Debug, Error)]
pub enum ShelfmarkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Content root {path} is unavailable: {source}")]
    ContentRootUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Shelfmark operations
pub type Result<T> = std::result::Result<T, ShelfmarkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlScheduler, CrawlSummary};
pub use query::{QueryService, SearchRequest, SearchResponse};
pub use storage::{PageMetadata, PageRecord, PageStore, SqliteStorage};
