//! Statistics from the index database
//!
//! This module provides functionality for extracting and displaying
//! index statistics and recent crawl history from the storage layer.

use crate::storage::{PageStore, RunRecord, RunStatus};
use crate::ShelfmarkError;
use std::fmt::Write;

/// How many runs `--stats` shows
const RECENT_RUN_LIMIT: u32 = 10;

/// Index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Number of pages in the index
    pub total_pages: u64,

    /// Most recent crawl runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

impl IndexStatistics {
    /// The newest run that finished successfully
    pub fn last_completed_run(&self) -> Option<&RunRecord> {
        self.recent_runs
            .iter()
            .find(|run| run.status == RunStatus::Completed)
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn PageStore) -> Result<IndexStatistics, ShelfmarkError> {
    Ok(IndexStatistics {
        total_pages: storage.count_pages()?,
        recent_runs: storage.recent_runs(RECENT_RUN_LIMIT)?,
    })
}

/// Renders statistics as a plain-text report
pub fn format_statistics(stats: &IndexStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Index Statistics ===\n");
    let _ = writeln!(out, "Indexed pages: {}", stats.total_pages);

    match stats.last_completed_run() {
        Some(run) => {
            let _ = writeln!(
                out,
                "Last completed crawl: run {} at {} ({}/{} pages updated)",
                run.id,
                run.finished_at.unwrap_or(run.started_at).to_rfc3339(),
                run.pages_updated.unwrap_or(0),
                run.pages_total.unwrap_or(0)
            );
        }
        None => {
            let _ = writeln!(out, "Last completed crawl: never");
        }
    }

    if !stats.recent_runs.is_empty() {
        let _ = writeln!(out, "\nRecent Runs ({}):", stats.recent_runs.len());
        for run in &stats.recent_runs {
            let duration = run
                .finished_at
                .map(|finished| format!("{}ms", (finished - run.started_at).num_milliseconds()))
                .unwrap_or_else(|| "-".to_string());

            let _ = write!(
                out,
                "  #{} {} {} {}",
                run.id,
                run.started_at.to_rfc3339(),
                run.status.to_db_string(),
                duration
            );
            if let Some(error) = &run.error_message {
                let _ = write!(out, " ({})", error);
            }
            let _ = writeln!(out);
        }
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &IndexStatistics) {
    print!("{}", format_statistics(stats));
}
