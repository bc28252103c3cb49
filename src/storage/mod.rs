//! Storage module for the page index
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Fingerprint-gated page upserts
//! - Paginated substring search
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{PageStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};

/// Metadata extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

/// Represents an indexed page in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub path: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub last_updated: DateTime<Utc>,
    pub fingerprint: String,
}

/// One page of search results plus the totals for the whole match set
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub records: Vec<PageRecord>,
    pub total_matches: u64,
    pub total_pages: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_total: Option<u64>,
    pub pages_updated: Option<u64>,
    pub error_message: Option<String>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Number of pages needed to hold `total` records
pub fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}
