//! Shelfmark main entry point
//!
//! This is the command-line interface for the Shelfmark page indexer.

use anyhow::Context;
use clap::Parser;
use shelfmark::config::{load_config_with_hash, Config};
use shelfmark::crawler::{logical_path, CrawlEngine, CrawlScheduler, PageWalker};
use shelfmark::query::QueryService;
use shelfmark::server::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelfmark: an incremental search index for static HTML pages
///
/// Shelfmark indexes every page under a content root, re-scans it on a fixed
/// interval to pick up changes, and serves both the pages and a search over
/// their titles, descriptions and keywords.
#[derive(Parser, Debug)]
#[command(name = "shelfmark")]
#[command(version)]
#[command(about = "Incremental search index for static HTML pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl once, print the summary and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run"])]
    once: bool,

    /// Show statistics from the index database and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run"])]
    stats: bool,

    /// Validate config and list the pages that would be indexed
    #[arg(long, conflicts_with_all = ["once", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.once {
        handle_once(&config, &config_hash)
    } else {
        handle_serve(config, config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelfmark=info,warn"),
            1 => EnvFilter::new("shelfmark=debug,info"),
            2 => EnvFilter::new("shelfmark=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Creates the content root and the database directory if missing
fn prepare_directories(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.content.root)
        .with_context(|| format!("failed to create {}", config.content.root.display()))?;

    if let Some(parent) = config.index.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    Ok(())
}

/// Handles the --dry-run mode: lists pages without touching the index
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Shelfmark Dry Run ===\n");
    println!("Content root: {}", config.content.root.display());
    println!("Page filename: {}", config.content.page_filename);
    println!("Database: {}", config.index.database_path.display());
    println!("Scan interval: {}s", config.crawler.scan_interval_secs);
    println!("Bind: {}", config.server.bind);
    println!();

    let mut count = 0;
    for page in PageWalker::new(&config.content.root, &config.content.page_filename)? {
        match page {
            Ok(file) => {
                count += 1;
                println!("  {}", logical_path(&config.content.root, &file));
            }
            Err(e) => println!("  ! {}", e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would index {} pages", count);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the index
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use shelfmark::output::{load_statistics, print_statistics};
    use shelfmark::storage::SqliteStorage;

    println!("Database: {}\n", config.index.database_path.display());

    let storage = SqliteStorage::open_read_only(&config.index.database_path)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --once mode: a single crawl
fn handle_once(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    prepare_directories(config)?;

    let summary = shelfmark::crawler::crawl(config, config_hash).context("crawl failed")?;
    println!("Indexing complete: {}", summary);

    Ok(())
}

/// Handles the default mode: crawl, then serve while re-crawling
async fn handle_serve(config: Config, config_hash: String) -> anyhow::Result<()> {
    prepare_directories(&config)?;

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;

    // The engine creates the schema, so it must open before the readers
    let engine = CrawlEngine::new(&config, &config_hash)?;
    let query = QueryService::open(&config.index.database_path, config.index.reader_connections)?;

    let scheduler = CrawlScheduler::new(engine, config.crawler.scan_interval());
    tracing::info!(
        "Re-crawling {} every {:?}",
        config.content.root.display(),
        scheduler.interval()
    );
    let crawl_loop = scheduler.start().await;

    let state = AppState::new(
        query,
        config.content.root.clone(),
        &config.content.page_filename,
    );
    let result = server::serve(addr, state, shutdown_signal()).await;

    crawl_loop.abort();
    result.context("server failed")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            tracing::error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
