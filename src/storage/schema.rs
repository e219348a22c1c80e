//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Summoner-Harvest database.
//!
//! Matches keep a handful of scalar columns for indexing; the full API payload
//! is stored as one JSON document in `matches.payload` (see
//! [`encode_match`](super::encode_match) / [`decode_match`](super::decode_match)).

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track process runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    cycles INTEGER NOT NULL DEFAULT 0,
    summoners_crawled INTEGER NOT NULL DEFAULT 0,
    matches_stored INTEGER NOT NULL DEFAULT 0,
    summoners_discovered INTEGER NOT NULL DEFAULT 0
);

-- Every summoner ever observed
CREATE TABLE IF NOT EXISTS summoners (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    profile_icon_id INTEGER NOT NULL DEFAULT 0,
    revision_date INTEGER NOT NULL DEFAULT 0,
    summoner_level INTEGER NOT NULL DEFAULT 0,
    last_crawled INTEGER NOT NULL DEFAULT 0
);

-- Not unique: names are freed by renames and reused by other summoners
CREATE INDEX IF NOT EXISTS idx_summoners_name ON summoners(name);
CREATE INDEX IF NOT EXISTS idx_summoners_last_crawled ON summoners(last_crawled);

-- Archived matches, write-once
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY,
    match_mode TEXT,
    match_type TEXT,
    queue_type TEXT,
    season TEXT,
    match_creation INTEGER,
    match_duration INTEGER,
    payload TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_matches_mode ON matches(match_mode);
CREATE INDEX IF NOT EXISTS idx_matches_type ON matches(match_type);
CREATE INDEX IF NOT EXISTS idx_matches_queue_type ON matches(queue_type);
CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(season);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
