use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Shelfmark
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub content: ContentConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the pages live and which files count as pages
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Root directory of the static site
    pub root: PathBuf,

    /// File name recognized as a page (compared case-insensitively)
    #[serde(rename = "page-filename", default = "default_page_filename")]
    pub page_filename: String,
}

/// Index database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,

    /// Number of read-only connections used for search
    #[serde(rename = "reader-connections", default = "default_reader_connections")]
    pub reader_connections: u32,
}

/// Crawl scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seconds to wait after one crawl finishes before the next one starts
    #[serde(rename = "scan-interval-secs", default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (host:port)
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl CrawlerConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

impl Config {
    /// Builds a configuration with defaults for everything but the two paths
    pub fn new(root: impl AsRef<Path>, database_path: impl AsRef<Path>) -> Self {
        Self {
            content: ContentConfig {
                root: root.as_ref().to_path_buf(),
                page_filename: default_page_filename(),
            },
            index: IndexConfig {
                database_path: database_path.as_ref().to_path_buf(),
                reader_connections: default_reader_connections(),
            },
            crawler: CrawlerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_page_filename() -> String {
    "index.html".to_string()
}

fn default_reader_connections() -> u32 {
    4
}

fn default_scan_interval_secs() -> u64 {
    60
}

fn default_bind() -> String {
    "0.0.0.0:2025".to_string()
}
