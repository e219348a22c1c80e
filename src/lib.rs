//! Summoner-Harvest: an incremental match archiver
//!
//! This crate crawls a rate-limited game-statistics API, walking the
//! "match → participant → new summoner" graph outward from a set of seed
//! summoners and archiving every match it finds exactly once.

pub mod api;
pub mod config;
pub mod crawler;
pub mod storage;

use thiserror::Error;

/// Main error type for Summoner-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Summoner-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{MatchDetail, Summoner};
pub use config::Config;
pub use crawler::{ApiClient, Coordinator, RateGovernor};
pub use storage::{SqliteStorage, Storage};
