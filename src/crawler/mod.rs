//! Crawler module for keeping the index in sync with the content root
//!
//! This module contains the core crawling logic, including:
//! - Content root traversal
//! - Fingerprint-based change detection
//! - HTML metadata extraction
//! - The crawl engine and its periodic scheduler

mod engine;
mod extractor;
mod fingerprint;
mod scheduler;
mod walker;

pub use engine::{CrawlEngine, CrawlSummary};
pub use extractor::{extract_metadata, DESCRIPTION_LIMIT};
pub use fingerprint::Fingerprint;
pub use scheduler::CrawlScheduler;
pub use walker::{logical_path, PageWalker};

use crate::config::Config;
use crate::ShelfmarkError;

/// Runs a single crawl of the configured content root
///
/// This is the entry point for one-shot indexing. It will:
/// 1. Open (or create) the index database
/// 2. Walk the content root
/// 3. Re-extract every page whose fingerprint changed
/// 4. Record the run and return its summary
///
/// # Example
///
/// ```no_run
/// use shelfmark::config::load_config_with_hash;
/// use shelfmark::crawler::crawl;
/// use std::path::Path;
///
/// let (config, hash) = load_config_with_hash(Path::new("shelfmark.toml")).unwrap();
/// let summary = crawl(&config, &hash).unwrap();
/// println!("{}", summary);
/// ```
pub fn crawl(config: &Config, config_hash: &str) -> Result<CrawlSummary, ShelfmarkError> {
    let mut engine = CrawlEngine::new(config, config_hash)?;
    engine.crawl()
}
