//! Storage traits and error types
//!
//! This module defines the trait interface for index backends and
//! associated error types.

use crate::storage::{PageMetadata, PageRecord, RunRecord, SearchResults};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

impl StorageError {
    /// True when the failure came from lock contention and a retry may succeed
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index backend implementations
///
/// The crawl engine is the only writer. Readers hold their own handles and
/// must always observe whole records.
pub trait PageStore {
    // ===== Page Index =====

    /// Returns the stored fingerprint for a page, if the page is indexed
    fn lookup_fingerprint(&self, path: &str) -> StorageResult<Option<String>>;

    /// Inserts or overwrites a page record
    ///
    /// Nothing is written when the stored fingerprint equals `fingerprint`, or
    /// when `fingerprint` is empty (no usable comparison). Returns whether a
    /// write occurred; `last_updated` is stamped only then.
    fn upsert_page(
        &mut self,
        path: &str,
        metadata: &PageMetadata,
        fingerprint: &str,
    ) -> StorageResult<bool>;

    /// Gets a page by its logical path
    fn get_page(&self, path: &str) -> StorageResult<Option<PageRecord>>;

    /// Substring search over title, description and keywords
    ///
    /// An empty query matches every record. Results are ordered by title and
    /// paginated from page 1; a page past the end is empty but still carries
    /// the totals.
    fn search(&self, query: &str, page: u32, page_size: u32) -> StorageResult<SearchResults>;

    /// Gets total page count
    fn count_pages(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed with its page counts
    fn complete_run(&mut self, run_id: i64, total: u64, updated: u64) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>>;
}
