use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Summoner-Harvest
///
/// Every section is optional; missing values fall back to defaults that match
/// a development API key (10 requests / 10 s, 500 requests / 10 min).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
    pub storage: StorageConfig,
    /// Summoner names used to bootstrap an empty database
    pub seeds: Vec<String>,
}

/// Remote API location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host of the API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Region path segment
    pub region: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// API key; normally supplied on the command line instead
    #[serde(skip)]
    pub token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://na.api.pvp.net".to_string(),
            region: "na".to_string(),
            timeout_secs: 30,
            token: String::new(),
        }
    }
}

/// Request quotas enforced by the rate governor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per short window
    #[serde(rename = "short-limit")]
    pub short_limit: usize,

    #[serde(rename = "short-window-secs")]
    pub short_window_secs: u64,

    /// Extra wait added when the short window is saturated (milliseconds)
    #[serde(rename = "short-margin-ms")]
    pub short_margin_ms: u64,

    /// Maximum requests per long window
    #[serde(rename = "long-limit")]
    pub long_limit: usize,

    #[serde(rename = "long-window-secs")]
    pub long_window_secs: u64,

    /// Extra wait added when the long window is saturated (milliseconds)
    #[serde(rename = "long-margin-ms")]
    pub long_margin_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            short_limit: 10,
            short_window_secs: 10,
            short_margin_ms: 1_000,
            long_limit: 500,
            long_window_secs: 600,
            long_margin_ms: 30_000,
        }
    }
}

impl RateLimitConfig {
    pub fn short_window(&self) -> Duration {
        Duration::from_secs(self.short_window_secs)
    }

    pub fn short_margin(&self) -> Duration {
        Duration::from_millis(self.short_margin_ms)
    }

    pub fn long_window(&self) -> Duration {
        Duration::from_secs(self.long_window_secs)
    }

    pub fn long_margin(&self) -> Duration {
        Duration::from_millis(self.long_margin_ms)
    }
}

/// Retry behavior of the fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum attempts per request
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed pause before each retry, on top of rate limiting (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Treat HTTP 5xx as transient instead of fatal
    #[serde(rename = "retry-server-errors")]
    pub retry_server_errors: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 10_000,
            retry_server_errors: false,
        }
    }
}

/// Crawl cycle tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum summoners selected per cycle
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// A summoner becomes eligible again this long after its last crawl (seconds)
    #[serde(rename = "recrawl-after-secs")]
    pub recrawl_after_secs: i64,

    /// Offset step between match history pages
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Pause before selecting again after the store failed to select a batch
    /// (milliseconds)
    #[serde(rename = "selection-retry-ms")]
    pub selection_retry_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            recrawl_after_secs: 12 * 60 * 60,
            page_size: crate::api::HISTORY_PAGE_SIZE,
            selection_retry_ms: 5_000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./harvest.db".to_string(),
        }
    }
}
