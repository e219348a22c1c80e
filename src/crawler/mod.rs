//! Crawler module for walking the match graph
//!
//! This module contains the core crawling logic, including:
//! - Sliding-window request governing
//! - HTTP fetching with retry logic
//! - The per-cycle frontier of newly discovered summoners
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod governor;

pub use coordinator::{Coordinator, CycleReport};
pub use fetcher::{build_http_client, ApiClient, FetchError, RetryPolicy};
pub use frontier::Frontier;
pub use governor::{RateGovernor, Window};

use crate::config::{validate, Config};
use crate::storage::{open_storage, RunStatus, Storage};
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the configuration and open the storage layer
/// 2. Record a new run
/// 3. Build the API client
/// 4. Seed the database from `config.seeds`, if any
/// 5. Run crawl cycles until nothing is due or `shutdown` is set
/// 6. Close the run record with its final status and totals
///
/// # Arguments
///
/// * `config` - The crawler configuration, with `api.token` set
/// * `config_hash` - Hash of the configuration, stored with the run
/// * `shutdown` - Set to stop the crawl at the next cycle boundary
///
/// # Returns
///
/// * `Ok(RunStatus)` - `Completed` or `Interrupted`
/// * `Err(HarvestError)` - The configuration is invalid, storage could not be
///   opened, or seeding failed
///
/// # Example
///
/// ```no_run
/// use summoner_harvest::config::Config;
/// use summoner_harvest::crawler::run_crawl;
/// use std::sync::atomic::AtomicBool;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.api.token = "my-api-key".to_string();
/// config.seeds = vec!["Ana".to_string()];
/// run_crawl(config, "none", &AtomicBool::new(false)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: &str,
    shutdown: &AtomicBool,
) -> crate::Result<RunStatus> {
    validate(&config)?;

    let mut storage = open_storage(Path::new(&config.storage.database_path))?;

    if let Some(previous) = storage.get_latest_run()? {
        if previous.status == RunStatus::Running {
            tracing::warn!(
                "Previous run {} did not finish cleanly; stale summoners will be picked up again",
                previous.id
            );
        }
    }

    let run_id = storage.create_run(config_hash)?;
    tracing::info!("Starting run {}", run_id);

    let client = ApiClient::new(&config)?;
    let mut coordinator = Coordinator::new(client, storage, config.crawl.clone());

    let outcome = match coordinator.seed(&config.seeds).await {
        Ok(_) => coordinator.run(shutdown).await,
        Err(e) => Err(e),
    };

    let status = match &outcome {
        Ok(status) => *status,
        Err(_) => RunStatus::Failed,
    };
    let totals = coordinator.totals();
    if let Err(e) = coordinator
        .storage_mut()
        .complete_run(run_id, status, &totals)
    {
        tracing::error!("Failed to record the end of run {}: {}", run_id, e);
    }

    tracing::info!(
        "Run {} finished ({:?}): {} cycles, {} summoners crawled, {} matches stored, {} summoners discovered",
        run_id,
        status,
        totals.cycles,
        totals.summoners_crawled,
        totals.matches_stored,
        totals.summoners_discovered
    );

    outcome
}
