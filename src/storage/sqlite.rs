//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::api::{MatchDetail, Summoner};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, RunTotals, SummonerRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Serializes a match into the document stored in `matches.payload`
///
/// The document is the API's own JSON shape (camelCase keys), typed fields and
/// opaque remainder together, so it can be decoded without the schema.
pub fn encode_match(detail: &MatchDetail) -> StorageResult<String> {
    serde_json::to_string(detail).map_err(|source| StorageError::Serialization {
        match_id: detail.match_id,
        source,
    })
}

/// Inverse of [`encode_match`]
pub fn decode_match(match_id: i64, payload: &str) -> StorageResult<MatchDetail> {
    serde_json::from_str(payload)
        .map_err(|source| StorageError::Serialization { match_id, source })
}

fn summoner_from_row(row: &Row<'_>) -> rusqlite::Result<SummonerRecord> {
    Ok(SummonerRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        profile_icon_id: row.get(2)?,
        revision_date: row.get(3)?,
        summoner_level: row.get(4)?,
        last_crawled: row.get(5)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        totals: RunTotals {
            cycles: row.get::<_, i64>(5)? as u64,
            summoners_crawled: row.get::<_, i64>(6)? as u64,
            matches_stored: row.get::<_, i64>(7)? as u64,
            summoners_discovered: row.get::<_, i64>(8)? as u64,
        },
    })
}

const SUMMONER_COLUMNS: &str =
    "id, name, profile_icon_id, revision_date, summoner_level, last_crawled";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, cycles, \
     summoners_crawled, matches_stored, summoners_discovered";

impl Storage for SqliteStorage {
    // ===== Summoners =====

    fn find_stale_summoners(
        &self,
        older_than: i64,
        limit: usize,
    ) -> StorageResult<Vec<SummonerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM summoners WHERE last_crawled < ?1
             ORDER BY last_crawled ASC, id ASC LIMIT ?2",
            SUMMONER_COLUMNS
        ))?;

        let summoners = stmt
            .query_map(params![older_than, limit as i64], summoner_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summoners)
    }

    fn summoner_exists(&self, summoner_id: i64) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM summoners WHERE id = ?1",
                params![summoner_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn upsert_summoners(&mut self, summoners: &[Summoner]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO summoners
                 (id, name, profile_icon_id, revision_date, summoner_level, last_crawled)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            )?;
            for summoner in summoners {
                inserted += stmt.execute(params![
                    summoner.id,
                    summoner.name,
                    summoner.profile_icon_id,
                    summoner.revision_date,
                    summoner.summoner_level
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn update_last_crawled(&mut self, summoner_id: i64, timestamp: i64) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE summoners SET last_crawled = ?1 WHERE id = ?2",
            params![timestamp, summoner_id],
        )?;
        if changed == 0 {
            return Err(StorageError::SummonerNotFound(summoner_id));
        }
        Ok(())
    }

    fn get_summoner(&self, summoner_id: i64) -> StorageResult<Option<SummonerRecord>> {
        let summoner = self
            .conn
            .query_row(
                &format!("SELECT {} FROM summoners WHERE id = ?1", SUMMONER_COLUMNS),
                params![summoner_id],
                summoner_from_row,
            )
            .optional()?;
        Ok(summoner)
    }

    fn count_summoners(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM summoners", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_uncrawled(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM summoners WHERE last_crawled = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Matches =====

    fn match_exists(&self, match_id: i64) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM matches WHERE id = ?1",
                params![match_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_match(&mut self, detail: &MatchDetail) -> StorageResult<bool> {
        let payload = encode_match(detail)?;
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO matches
             (id, match_mode, match_type, queue_type, season, match_creation, match_duration,
              payload, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                detail.match_id,
                detail.match_mode,
                detail.match_type,
                detail.queue_type,
                detail.season,
                detail.match_creation,
                detail.match_duration,
                payload,
                now
            ],
        )?;
        Ok(inserted == 1)
    }

    fn get_match(&self, match_id: i64) -> StorageResult<Option<MatchDetail>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM matches WHERE id = ?1",
                params![match_id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|payload| decode_match(match_id, &payload))
            .transpose()
    }

    fn count_matches(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, cycles = ?3, summoners_crawled = ?4,
             matches_stored = ?5, summoners_discovered = ?6 WHERE id = ?7",
            params![
                status.to_db_string(),
                now,
                totals.cycles as i64,
                totals.summoners_crawled as i64,
                totals.matches_stored as i64,
                totals.summoners_discovered as i64,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }
}
