//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::api::{MatchDetail, Summoner};
use crate::storage::{RunRecord, RunStatus, RunTotals, SummonerRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Summoner not found: {0}")]
    SummonerNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error for match {match_id}: {source}")]
    Serialization {
        match_id: i64,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The crawl only ever talks to the database through this contract. Summoners
/// are insert-or-ignore; matches are write-once.
pub trait Storage {
    // ===== Summoners =====

    /// Returns summoners last crawled before `older_than`
    ///
    /// # Arguments
    ///
    /// * `older_than` - Epoch seconds; summoners with `last_crawled < older_than` qualify
    /// * `limit` - Maximum number of summoners to return
    ///
    /// # Returns
    ///
    /// Summoners ordered by `last_crawled` ascending, so the longest-waiting
    /// ones are served first.
    fn find_stale_summoners(
        &self,
        older_than: i64,
        limit: usize,
    ) -> StorageResult<Vec<SummonerRecord>>;

    /// Checks whether a summoner id is already known
    fn summoner_exists(&self, summoner_id: i64) -> StorageResult<bool>;

    /// Inserts summoners with `last_crawled = 0`, ignoring ids already present
    ///
    /// # Returns
    ///
    /// The number of summoners actually inserted
    fn upsert_summoners(&mut self, summoners: &[Summoner]) -> StorageResult<usize>;

    /// Sets the last crawl time (epoch seconds) of a summoner
    fn update_last_crawled(&mut self, summoner_id: i64, timestamp: i64) -> StorageResult<()>;

    /// Gets a summoner by id
    fn get_summoner(&self, summoner_id: i64) -> StorageResult<Option<SummonerRecord>>;

    /// Gets total summoner count
    fn count_summoners(&self) -> StorageResult<u64>;

    /// Counts summoners that have never been crawled
    fn count_uncrawled(&self) -> StorageResult<u64>;

    // ===== Matches =====

    /// Checks whether a match id is already archived
    fn match_exists(&self, match_id: i64) -> StorageResult<bool>;

    /// Archives a match
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The match was stored
    /// * `Ok(false)` - A match with this id already exists; nothing changed
    fn insert_match(&mut self, detail: &MatchDetail) -> StorageResult<bool>;

    /// Gets an archived match by id
    fn get_match(&self, match_id: i64) -> StorageResult<Option<MatchDetail>>;

    /// Gets total match count
    fn count_matches(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new run record
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration that drives this run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Finishes a run with its final status and totals
    fn complete_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals)
        -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
