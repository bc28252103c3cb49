//! Query facade over the page index
//!
//! Translates loosely typed search requests (as they arrive from a query
//! string) into index searches, using a small pool of read-only connections
//! so searches run alongside a crawl.

use crate::storage::{PageStore, SqliteStorage, StorageResult};
use crate::ShelfmarkError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// Results returned per page
pub const PAGE_SIZE: u32 = 30;

/// A search request as received from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    /// Free-text query; missing or blank matches every page
    #[serde(default)]
    pub q: Option<String>,

    /// Requested page number, unvalidated
    #[serde(default)]
    pub page: Option<String>,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            page: Some(page.into()),
        }
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    pub description: String,
}

/// One page of search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub page: u32,
    pub total_pages: u64,
    pub total_records: u64,
    pub results: Vec<SearchHit>,
}

/// Parses a page number, falling back to 1 for anything unusable
///
/// # Example
///
/// ```
/// use shelfmark::query::parse_page_number;
///
/// assert_eq!(parse_page_number(Some("3")), 3);
/// assert_eq!(parse_page_number(Some("abc")), 1);
/// assert_eq!(parse_page_number(Some("-2")), 1);
/// assert_eq!(parse_page_number(None), 1);
/// ```
pub fn parse_page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&n| n >= 1)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// Search service backed by a pool of read-only index connections
pub struct QueryService {
    readers: Vec<Mutex<SqliteStorage>>,
    next: AtomicUsize,
}

impl QueryService {
    /// Opens `connections` read-only handles on the index database
    ///
    /// The database must already exist; open the crawl engine first.
    pub fn open(database_path: &Path, connections: u32) -> Result<Self, ShelfmarkError> {
        let readers = (0..connections.max(1))
            .map(|_| SqliteStorage::open_read_only(database_path).map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            readers,
            next: AtomicUsize::new(0),
        })
    }

    /// Runs a search
    ///
    /// Either a complete page is returned or an error; a storage failure
    /// never produces a partial page.
    pub fn search(&self, request: &SearchRequest) -> StorageResult<SearchResponse> {
        let query = request.q.as_deref().unwrap_or_default().trim();
        let page = parse_page_number(request.page.as_deref());

        let results = self.checkout().search(query, page, PAGE_SIZE)?;

        Ok(SearchResponse {
            query: query.to_string(),
            page: results.page,
            total_pages: results.total_pages,
            total_records: results.total_matches,
            results: results
                .records
                .into_iter()
                .map(|record| SearchHit {
                    path: record.path,
                    title: record.title,
                    description: record.description,
                })
                .collect(),
        })
    }

    /// Takes the first idle reader, starting from a rotating offset
    fn checkout(&self) -> MutexGuard<'_, SqliteStorage> {
        let len = self.readers.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;

        for offset in 0..len {
            match self.readers[(start + offset) % len].try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            }
        }

        self.readers[start]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
