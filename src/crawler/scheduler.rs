//! Scheduler for periodic re-crawls
//!
//! This module handles:
//! - Running the first crawl before anything is served
//! - Re-crawling forever, waiting a fixed interval after each crawl ends
//! - Keeping crawls from overlapping
//! - Logging failed crawls without stopping the loop

use crate::crawler::engine::{CrawlEngine, CrawlSummary};
use crate::ShelfmarkError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Scheduler owns the crawl engine and decides when it runs
///
/// The engine sits behind a mutex, so at most one crawl runs at a time no
/// matter who calls [`CrawlScheduler::run_once`].
#[derive(Clone)]
pub struct CrawlScheduler {
    engine: Arc<Mutex<CrawlEngine>>,
    interval: Duration,
}

impl CrawlScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `engine` - The crawl engine to drive
    /// * `interval` - Wait between the end of one crawl and the start of the next
    pub fn new(engine: CrawlEngine, interval: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one crawl on the blocking pool and waits for it
    pub async fn run_once(&self) -> Result<CrawlSummary, ShelfmarkError> {
        let engine = Arc::clone(&self.engine);

        tokio::task::spawn_blocking(move || {
            // A panicked crawl rolled back its open transaction on unwind
            let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
            engine.crawl()
        })
        .await
        .map_err(|e| ShelfmarkError::Task(e.to_string()))?
    }

    /// Runs the initial crawl, then spawns the background loop
    ///
    /// The returned future resolves only after the first crawl has finished,
    /// so callers can await it before accepting requests.
    pub async fn start(self) -> JoinHandle<()> {
        self.run_logged().await;
        tokio::spawn(async move { self.run_forever().await })
    }

    /// Waits one interval, crawls, and repeats forever
    pub async fn run_forever(&self) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.run_logged().await;
        }
    }

    async fn run_logged(&self) {
        match self.run_once().await {
            Ok(summary) => {
                tracing::debug!("Next crawl in {:?} ({} pages seen)", self.interval, summary.total);
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
            }
        }
    }
}
