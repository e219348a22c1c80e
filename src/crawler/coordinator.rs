//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that walks the match graph:
//! - Selecting a batch of summoners that are due for a crawl
//! - Paging through each summoner's match history until nothing new turns up
//! - Archiving every match not seen before
//! - Collecting participants we have never seen and looking them up in batches
//! - Marking the batch as freshly crawled
//!
//! Failures are contained to the summoner, page, match, or lookup batch they
//! occur in; they are logged and the cycle carries on.

use crate::api::MAX_SUMMONERS_PER_QUERY;
use crate::config::CrawlConfig;
use crate::crawler::fetcher::ApiClient;
use crate::crawler::frontier::Frontier;
use crate::storage::{RunStatus, RunTotals, Storage, SummonerRecord};
use crate::HarvestError;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What one crawl cycle accomplished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Summoners selected and marked as crawled
    pub summoners_crawled: u64,
    /// Match history pages fetched
    pub history_pages: u64,
    /// Matches newly archived
    pub matches_stored: u64,
    /// New summoners persisted from participant lookups
    pub summoners_discovered: u64,
    /// Fetch or storage failures that were logged and skipped
    pub failures: u64,
}

/// State carried through one cycle
#[derive(Debug, Default)]
struct CycleState {
    frontier: Frontier,
    report: CycleReport,
}

/// Main crawler coordinator structure
///
/// Runs strictly sequentially: one request in flight at a time, all of them
/// through the single [`ApiClient`] and its rate governor.
pub struct Coordinator<S: Storage> {
    client: ApiClient,
    storage: S,
    crawl: CrawlConfig,
    totals: RunTotals,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `client` - API client (owns the rate governor)
    /// * `storage` - Storage backend
    /// * `crawl` - Cycle tuning: batch size, recrawl threshold, page size
    pub fn new(client: ApiClient, storage: S, crawl: CrawlConfig) -> Self {
        Self {
            client,
            storage,
            crawl,
            totals: RunTotals::default(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Totals accumulated over every cycle run so far
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Looks up seed summoners by name and stores them as never crawled
    ///
    /// Unlike lookups during the crawl, a failure here is fatal: without seeds
    /// an empty database has nothing to crawl.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of summoners newly inserted
    /// * `Err(HarvestError)` - A lookup batch or the insert failed
    pub async fn seed(&mut self, names: &[String]) -> Result<usize, HarvestError> {
        let mut inserted = 0;

        for chunk in names.chunks(MAX_SUMMONERS_PER_QUERY) {
            let summoners = self.client.summoners_by_name(chunk).await?;

            if summoners.len() < chunk.len() {
                tracing::warn!(
                    "Seed lookup returned {} of {} requested summoners",
                    summoners.len(),
                    chunk.len()
                );
            }

            inserted += self.storage.upsert_summoners(&summoners)?;
        }

        tracing::info!("Seeded {} new summoners from {} names", inserted, names.len());
        Ok(inserted)
    }

    /// Runs crawl cycles until nothing is due or shutdown is requested
    ///
    /// The shutdown flag is checked once per cycle; a cycle in progress always
    /// finishes so no summoner is left half-processed. If the store fails to
    /// select a batch, the failure is logged and selection is retried after
    /// `selection_retry_ms`.
    ///
    /// # Returns
    ///
    /// * `Ok(RunStatus::Completed)` - No stale summoners remain
    /// * `Ok(RunStatus::Interrupted)` - Shutdown was requested
    pub async fn run(&mut self, shutdown: &AtomicBool) -> Result<RunStatus, HarvestError> {
        let start_time = Instant::now();
        let retry_delay = Duration::from_millis(self.crawl.selection_retry_ms);
        let mut selection_failures = 0u64;

        loop {
            if shutdown.load(Ordering::SeqCst) {
                tracing::info!(
                    "Shutdown requested, stopping after {} cycles",
                    self.totals.cycles
                );
                return Ok(RunStatus::Interrupted);
            }

            let cycle = match self.run_cycle().await {
                Ok(cycle) => cycle,
                Err(e) => {
                    selection_failures += 1;
                    tracing::error!(
                        "Failed to select summoners for crawling (failure {}), retrying in {:?}: {}",
                        selection_failures,
                        retry_delay,
                        e
                    );
                    tokio::time::sleep(retry_delay).await;
                    continue;
                }
            };

            match cycle {
                Some(report) => {
                    tracing::info!(
                        "Cycle {}: {} summoners crawled, {} pages, {} new matches, {} new summoners, {} failures ({:?} elapsed)",
                        self.totals.cycles,
                        report.summoners_crawled,
                        report.history_pages,
                        report.matches_stored,
                        report.summoners_discovered,
                        report.failures,
                        start_time.elapsed()
                    );
                }
                None => {
                    tracing::info!("No summoners due for a crawl, done");
                    return Ok(RunStatus::Completed);
                }
            }
        }
    }

    /// Runs a single crawl cycle
    ///
    /// # Returns
    ///
    /// * `Ok(Some(CycleReport))` - A batch was crawled
    /// * `Ok(None)` - No summoner was due; the crawl is finished
    /// * `Err(HarvestError)` - The batch could not be selected
    pub async fn run_cycle(&mut self) -> Result<Option<CycleReport>, HarvestError> {
        let older_than = Utc::now().timestamp() - self.crawl.recrawl_after_secs;
        let batch = self
            .storage
            .find_stale_summoners(older_than, self.crawl.batch_size)?;

        if batch.is_empty() {
            return Ok(None);
        }

        tracing::info!("Selected {} summoners for crawling", batch.len());

        let mut state = CycleState::default();

        for summoner in &batch {
            self.scan_history(summoner, &mut state).await;
        }

        let frontier = std::mem::take(&mut state.frontier);
        self.lookup_new_summoners(frontier, &mut state.report).await;

        let now = Utc::now().timestamp();
        for summoner in &batch {
            match self.storage.update_last_crawled(summoner.id, now) {
                Ok(()) => state.report.summoners_crawled += 1,
                Err(e) => {
                    tracing::error!(
                        "Failed to update last crawl time of summoner {}: {}",
                        summoner.id,
                        e
                    );
                    state.report.failures += 1;
                }
            }
        }

        let report = state.report;
        self.totals.cycles += 1;
        self.totals.summoners_crawled += report.summoners_crawled;
        self.totals.matches_stored += report.matches_stored;
        self.totals.summoners_discovered += report.summoners_discovered;

        Ok(Some(report))
    }

    /// Pages through a summoner's match history
    ///
    /// Stops at the first page without any match we have not archived yet, or
    /// when a page cannot be fetched.
    async fn scan_history(&mut self, summoner: &SummonerRecord, state: &mut CycleState) {
        let mut begin_index = 0u32;

        loop {
            let match_ids = match self.client.match_history(summoner.id, begin_index).await {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::error!(
                        "Failed to fetch match history of summoner {} at offset {}: {}",
                        summoner.id,
                        begin_index,
                        e
                    );
                    state.report.failures += 1;
                    return;
                }
            };
            state.report.history_pages += 1;

            let mut novel = 0;
            for match_id in match_ids {
                match self.storage.match_exists(match_id) {
                    Ok(true) => continue,
                    Ok(false) => {
                        novel += 1;
                        self.ingest_match(match_id, state).await;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to check whether match {} exists: {}", match_id, e);
                        state.report.failures += 1;
                    }
                }
            }

            tracing::debug!(
                "Summoner {} offset {}: {} new matches",
                summoner.id,
                begin_index,
                novel
            );

            if novel == 0 {
                return;
            }
            begin_index += self.crawl.page_size;
        }
    }

    /// Fetches, archives, and mines one match we have not seen before
    async fn ingest_match(&mut self, match_id: i64, state: &mut CycleState) {
        let detail = match self.client.match_detail(match_id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::error!("Failed to fetch match {}: {}", match_id, e);
                state.report.failures += 1;
                return;
            }
        };

        match self.storage.insert_match(&detail) {
            Ok(true) => state.report.matches_stored += 1,
            Ok(false) => tracing::debug!("Match {} was already archived", match_id),
            Err(e) => {
                tracing::error!("Failed to store match {}: {}", match_id, e);
                state.report.failures += 1;
            }
        }

        for summoner_id in detail.participant_summoner_ids() {
            if state.frontier.contains(summoner_id) {
                continue;
            }
            match self.storage.summoner_exists(summoner_id) {
                Ok(true) => {}
                Ok(false) => {
                    state.frontier.insert(summoner_id);
                }
                Err(e) => {
                    tracing::warn!("Failed to check whether summoner {} exists: {}", summoner_id, e);
                    state.report.failures += 1;
                }
            }
        }
    }

    /// Looks up every newly referenced summoner and stores them as never crawled
    async fn lookup_new_summoners(&mut self, frontier: Frontier, report: &mut CycleReport) {
        if frontier.is_empty() {
            return;
        }

        tracing::debug!("Looking up {} new summoners", frontier.len());

        for chunk in frontier.into_chunks(MAX_SUMMONERS_PER_QUERY) {
            let summoners = match self.client.summoners_by_id(&chunk).await {
                Ok(summoners) => summoners,
                Err(e) => {
                    tracing::error!("Failed to look up {} summoners: {}", chunk.len(), e);
                    report.failures += 1;
                    continue;
                }
            };

            match self.storage.upsert_summoners(&summoners) {
                Ok(inserted) => report.summoners_discovered += inserted as u64,
                Err(e) => {
                    tracing::error!("Failed to store {} summoners: {}", summoners.len(), e);
                    report.failures += 1;
                }
            }
        }
    }
}
