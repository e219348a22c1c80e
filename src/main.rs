//! Summoner-Harvest main entry point
//!
//! This is the command-line interface for the Summoner-Harvest match archiver.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use summoner_harvest::config::{load_config_with_hash, Config};
use summoner_harvest::crawler::run_crawl;
use summoner_harvest::storage::RunStatus;
use tracing_subscriber::EnvFilter;

/// Summoner-Harvest: an incremental match archiver
///
/// Crawls the match history of known summoners, archives every match it has
/// not seen before, and adds the other participants to the set of summoners
/// to crawl, all within the API's request quotas.
#[derive(Parser, Debug)]
#[command(name = "summoner-harvest")]
#[command(version)]
#[command(about = "An incremental, rate-limited match archiver", long_about = None)]
struct Cli {
    /// API key for the game-statistics API
    #[arg(value_name = "API_KEY")]
    token: String,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum requests per short window (default: 10 per 10s)
    #[arg(long, value_name = "N")]
    short_limit: Option<usize>,

    /// Maximum requests per long window (default: 500 per 10min)
    #[arg(long, value_name = "N")]
    long_limit: Option<usize>,

    /// Maximum attempts per request
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Path to the SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Comma-separated summoner names used to seed the database
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    seeds: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => (Config::default(), "default".to_string()),
    };

    apply_overrides(&mut config, cli);

    if config.api.token.trim().is_empty() {
        bail!("API key cannot be empty");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received, finishing the current cycle...");
                    shutdown.store(true, Ordering::SeqCst);
                }
                Err(e) => tracing::error!("Failed to wait for Ctrl+C: {}", e),
            }
        });
    }

    tracing::info!(
        "Rate limits: {} per {}s, {} per {}s; database: {}",
        config.rate_limit.short_limit,
        config.rate_limit.short_window_secs,
        config.rate_limit.long_limit,
        config.rate_limit.long_window_secs,
        config.storage.database_path
    );

    let status = run_crawl(config, &config_hash, &shutdown)
        .await
        .context("Crawl failed")?;

    match status {
        RunStatus::Interrupted => tracing::info!("Crawl interrupted, progress saved"),
        _ => tracing::info!("Crawl completed successfully"),
    }

    Ok(())
}

/// Layers command-line values over the file (or default) configuration
fn apply_overrides(config: &mut Config, cli: Cli) {
    config.api.token = cli.token;

    if let Some(limit) = cli.short_limit {
        config.rate_limit.short_limit = limit;
    }
    if let Some(limit) = cli.long_limit {
        config.rate_limit.long_limit = limit;
    }
    if let Some(retries) = cli.max_retries {
        config.fetch.max_retries = retries;
    }
    if let Some(database) = cli.database {
        config.storage.database_path = database;
    }

    let seeds: Vec<String> = cli
        .seeds
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !seeds.is_empty() {
        config.seeds = seeds;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("summoner_harvest=info,warn"),
            1 => EnvFilter::new("summoner_harvest=debug,info"),
            2 => EnvFilter::new("summoner_harvest=trace,debug"),
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
