//! Crawl engine - one incremental pass over the content root
//!
//! For each page file the engine:
//! - computes its fingerprint
//! - compares it with the stored one and stops there if they match
//! - reads and extracts metadata otherwise
//! - upserts the result into the index
//!
//! A problem with one file never stops the crawl. A missing content root or
//! a storage error does.

use crate::config::Config;
use crate::crawler::extractor::extract_metadata;
use crate::crawler::fingerprint::Fingerprint;
use crate::crawler::walker::{logical_path, PageWalker};
use crate::storage::{PageStore, SqliteStorage};
use crate::ShelfmarkError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Counts reported by one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Page files seen
    pub total: u64,

    /// Pages inserted or rewritten
    pub updated: u64,

    /// Pages whose fingerprint matched the index
    pub unchanged: u64,

    /// Pages that vanished or could not be stat-ed
    pub skipped: u64,

    /// Pages that could not be read
    pub failed: u64,

    pub elapsed: Duration,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} pages updated ({} unchanged, {} skipped, {} failed) in {:.2?}",
            self.updated, self.total, self.unchanged, self.skipped, self.failed, self.elapsed
        )
    }
}

/// What happened to a single page during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Updated,
    Unchanged,
    Skipped,
    Failed,
}

/// Crawl engine owning the index's single writable connection
pub struct CrawlEngine {
    root: PathBuf,
    page_filename: String,
    config_hash: String,
    storage: SqliteStorage,
}

impl CrawlEngine {
    /// Creates an engine for the configured content root and index
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash recorded with every crawl run
    pub fn new(config: &Config, config_hash: &str) -> Result<Self, ShelfmarkError> {
        let storage = SqliteStorage::new(&config.index.database_path)?;
        Ok(Self::with_storage(
            &config.content.root,
            &config.content.page_filename,
            config_hash,
            storage,
        ))
    }

    /// Creates an engine over an already opened storage
    pub fn with_storage(
        root: &Path,
        page_filename: &str,
        config_hash: &str,
        storage: SqliteStorage,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            page_filename: page_filename.to_string(),
            config_hash: config_hash.to_string(),
            storage,
        }
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Runs one full crawl and records it as a run
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl finished; per-page problems are counted
    /// * `Err(ShelfmarkError)` - The content root or the index was unavailable
    pub fn crawl(&mut self) -> Result<CrawlSummary, ShelfmarkError> {
        let run_id = self.storage.create_run(&self.config_hash)?;
        tracing::info!(
            "Starting crawl run {} of {}",
            run_id,
            self.root.display()
        );

        match self.crawl_pages() {
            Ok(summary) => {
                self.storage
                    .complete_run(run_id, summary.total, summary.updated)?;
                tracing::info!("Crawl run {} completed: {}", run_id, summary);
                Ok(summary)
            }
            Err(e) => {
                if let Err(mark_err) = self.storage.fail_run(run_id, &e.to_string()) {
                    tracing::warn!("Could not mark run {} as failed: {}", run_id, mark_err);
                }
                Err(e)
            }
        }
    }

    fn crawl_pages(&mut self) -> Result<CrawlSummary, ShelfmarkError> {
        let start_time = Instant::now();
        let mut summary = CrawlSummary::default();

        for page in PageWalker::new(&self.root, &self.page_filename)? {
            let file = match page {
                Ok(file) => file,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            summary.total += 1;
            match self.index_page(&file)? {
                PageOutcome::Updated => summary.updated += 1,
                PageOutcome::Unchanged => summary.unchanged += 1,
                PageOutcome::Skipped => summary.skipped += 1,
                PageOutcome::Failed => summary.failed += 1,
            }
        }

        summary.elapsed = start_time.elapsed();
        Ok(summary)
    }

    /// Indexes one page file
    ///
    /// Only storage errors are returned; file problems become outcomes.
    fn index_page(&mut self, file: &Path) -> Result<PageOutcome, ShelfmarkError> {
        let path = logical_path(&self.root, file);

        let fingerprint = Fingerprint::of_file(file);
        if !fingerprint.is_valid() {
            tracing::warn!("Skipping {}: file could not be stat-ed", path);
            return Ok(PageOutcome::Skipped);
        }

        let stored = self.storage.lookup_fingerprint(&path)?;
        if stored.as_deref() == Some(fingerprint.as_str()) {
            tracing::debug!("Unchanged: {}", path);
            return Ok(PageOutcome::Unchanged);
        }

        let html = match std::fs::read_to_string(file) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", file.display(), e);
                return Ok(PageOutcome::Failed);
            }
        };

        let metadata = extract_metadata(&html);
        if self
            .storage
            .upsert_page(&path, &metadata, fingerprint.as_str())?
        {
            tracing::info!("Updated: {}", path);
            Ok(PageOutcome::Updated)
        } else {
            Ok(PageOutcome::Unchanged)
        }
    }
}
