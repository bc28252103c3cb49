//! Output module for operator-facing reports
//!
//! This module handles:
//! - Loading index statistics and crawl run history
//! - Rendering them for the `--stats` command

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, IndexStatistics};
