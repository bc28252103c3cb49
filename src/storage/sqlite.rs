//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.
//! The database runs in WAL mode so one writer and any number of read-only
//! connections can work at the same time.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::{page_count, PageMetadata, PageRecord, RunRecord, RunStatus, SearchResults};
use crate::ShelfmarkError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const MATCH_CLAUSE: &str = r"(?1
    OR title LIKE ?2 ESCAPE '\'
    OR description LIKE ?2 ESCAPE '\'
    OR keywords LIKE ?2 ESCAPE '\')";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the index database for reading and writing
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ShelfmarkError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ShelfmarkError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens an existing index database read-only
    ///
    /// The database must already have been created by [`SqliteStorage::new`].
    pub fn open_read_only(path: &Path) -> Result<Self, ShelfmarkError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, ShelfmarkError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl PageStore for SqliteStorage {
    // ===== Page Index =====

    fn lookup_fingerprint(&self, path: &str) -> StorageResult<Option<String>> {
        let fingerprint = self
            .conn
            .query_row(
                "SELECT fingerprint FROM pages WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(fingerprint)
    }

    fn upsert_page(
        &mut self,
        path: &str,
        metadata: &PageMetadata,
        fingerprint: &str,
    ) -> StorageResult<bool> {
        if fingerprint.is_empty() {
            return Ok(false);
        }

        // Compare and write under one write lock
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored: Option<String> = tx
            .query_row(
                "SELECT fingerprint FROM pages WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;

        if stored.as_deref() == Some(fingerprint) {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO pages (path, title, description, keywords, last_updated, fingerprint)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(path) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                keywords = excluded.keywords,
                last_updated = excluded.last_updated,
                fingerprint = excluded.fingerprint",
            params![
                path,
                metadata.title,
                metadata.description,
                metadata.keywords,
                now,
                fingerprint
            ],
        )?;
        tx.commit()?;

        Ok(true)
    }

    fn get_page(&self, path: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                "SELECT path, title, description, keywords, last_updated, fingerprint
                 FROM pages WHERE path = ?1",
                params![path],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn search(&self, query: &str, page: u32, page_size: u32) -> StorageResult<SearchResults> {
        let page = page.max(1);
        let match_all = query.is_empty();
        let pattern = like_pattern(query);

        // Count and rows come from the same snapshot
        let tx = self.conn.unchecked_transaction()?;

        let total_matches: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM pages WHERE {MATCH_CLAUSE}"),
            params![match_all, pattern],
            |row| row.get(0),
        )?;
        let total_matches = total_matches.max(0) as u64;
        let total_pages = page_count(total_matches, page_size);

        let records = if u64::from(page) > total_pages {
            Vec::new()
        } else {
            let offset = i64::from(page - 1) * i64::from(page_size);
            let mut stmt = tx.prepare(&format!(
                "SELECT path, title, description, keywords, last_updated, fingerprint
                 FROM pages WHERE {MATCH_CLAUSE}
                 ORDER BY title ASC, path ASC
                 LIMIT ?3 OFFSET ?4"
            ))?;
            let rows = stmt
                .query_map(
                    params![match_all, pattern, i64::from(page_size), offset],
                    page_from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        tx.commit()?;

        Ok(SearchResults {
            records,
            total_matches,
            total_pages,
            page,
            page_size,
        })
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, total: u64, updated: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_total = ?3, pages_updated = ?4
             WHERE id = ?5",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                total as i64,
                updated as i64,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, error_message, run_id],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, pages_total,
                 pages_updated, error_message
                 FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status, pages_total,
             pages_updated, error_message
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        path: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        keywords: row.get(3)?,
        last_updated: timestamp_at(row, 4)?,
        fingerprint: row.get(5)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let status: String = row.get(4)?;
    let finished_at = match row.get::<_, Option<String>>(2)? {
        Some(raw) => Some(parse_timestamp(2, &raw)?),
        None => None,
    };

    Ok(RunRecord {
        id: row.get(0)?,
        started_at: timestamp_at(row, 1)?,
        finished_at,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&status).unwrap_or(RunStatus::Failed),
        pages_total: row.get::<_, Option<i64>>(5)?.map(|n| n as u64),
        pages_updated: row.get::<_, Option<i64>>(6)?.map(|n| n as u64),
        error_message: row.get(7)?,
    })
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(idx, &raw)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Wraps `query` in `%...%`, escaping LIKE wildcards so they match literally
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
