//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - Injecting the API key into every request
//! - Passing every attempt through the rate governor
//! - Retry logic for transient failures
//! - Error classification and JSON decoding

use crate::api::{
    with_query, Endpoints, MatchDetail, MatchHistory, Summoner, API_KEY_PARAM,
    BEGIN_INDEX_PARAM, MAX_SUMMONERS_PER_QUERY,
};
use crate::config::{ApiConfig, Config, FetchConfig};
use crate::crawler::governor::RateGovernor;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors produced while talking to the remote API
///
/// URLs carried by these errors never include the API key.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Rate limit exceeded for {url}")]
    RateLimited { url: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Unexpected status code {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Max retries exceeded after {attempts} attempts (last error: {last})")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("Unknown error occurred while fetching {url}: no attempt was made")]
    NoAttempts { url: String },

    #[error("Too many summoners in one query: {count} (max {max})")]
    TooManyIds { count: usize, max: usize },

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// How the fetcher reacts to failed attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per request, including the first
    pub max_retries: u32,

    /// Fixed pause before every retry, on top of the governor's wait
    pub retry_delay: Duration,

    /// Whether HTTP 5xx counts as transient
    pub retry_server_errors: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            retry_server_errors: config.retry_server_errors,
        }
    }

    /// Returns true if another attempt may succeed where this one failed
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Network error / timeout | Retry |
    /// | HTTP 429 | Retry |
    /// | 2xx with malformed body | Retry |
    /// | HTTP 5xx | Retry only if `retry_server_errors` |
    /// | Any other status | Fail immediately |
    pub fn is_transient(&self, error: &FetchError) -> bool {
        match error {
            FetchError::Network { .. } | FetchError::RateLimited { .. } | FetchError::Decode { .. } => {
                true
            }
            FetchError::Status { status, .. } => {
                self.retry_server_errors && (500..600).contains(status)
            }
            _ => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The API configuration (for the request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the game-statistics API
///
/// Owns the rate governor, so every request made through one `ApiClient`
/// shares the same quota bookkeeping.
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    token: String,
    governor: RateGovernor,
    policy: RetryPolicy,
}

impl ApiClient {
    /// Creates a client from the full configuration
    ///
    /// The API key is taken from `config.api.token`.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = build_http_client(&config.api).map_err(FetchError::Client)?;
        let endpoints = Endpoints::new(&config.api.base_url, &config.api.region)?;

        Ok(Self::with_parts(
            client,
            endpoints,
            config.api.token.clone(),
            RateGovernor::from_config(&config.rate_limit),
            RetryPolicy::from_config(&config.fetch),
        ))
    }

    /// Assembles a client from already-built parts
    pub fn with_parts(
        client: Client,
        endpoints: Endpoints,
        token: String,
        governor: RateGovernor,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            endpoints,
            token,
            governor,
            policy,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetches a resource and decodes it as JSON
    ///
    /// `params` are merged into the endpoint's query string; the API key is
    /// always added, replacing any key already present.
    ///
    /// Each attempt first waits on the rate governor, so failed attempts are
    /// counted against the quota exactly like successful ones.
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The first successfully decoded response
    /// * `Err(FetchError::RetriesExhausted)` - Every attempt failed transiently
    /// * `Err(FetchError)` - A fatal failure, returned without further attempts
    pub async fn fetch<T: DeserializeOwned>(
        &mut self,
        endpoint: &Url,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let shown = with_query(endpoint, params).to_string();

        let mut keyed: Vec<(&str, String)> = params.to_vec();
        keyed.push((API_KEY_PARAM, self.token.clone()));
        let url = with_query(endpoint, &keyed);

        let mut last_error = None;

        for attempt in 0..self.policy.max_retries {
            if attempt > 0 && !self.policy.retry_delay.is_zero() {
                tracing::debug!(
                    "Sleeping {:?} before retrying {}",
                    self.policy.retry_delay,
                    shown
                );
                tokio::time::sleep(self.policy.retry_delay).await;
            }

            self.governor.acquire().await;

            tracing::trace!("GET {} (attempt {})", shown, attempt + 1);
            match self.attempt(&url, &shown).await {
                Ok(value) => return Ok(value),
                Err(e) if self.policy.is_transient(&e) => {
                    tracing::warn!(
                        "Attempt {}/{} failed: {}",
                        attempt + 1,
                        self.policy.max_retries,
                        e
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::debug!("Giving up on {}: {}", shown, e);
                    return Err(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(FetchError::RetriesExhausted {
                attempts: self.policy.max_retries,
                last: Box::new(last),
            }),
            None => Err(FetchError::NoAttempts { url: shown }),
        }
    }

    /// Performs one request and classifies its outcome
    async fn attempt<T: DeserializeOwned>(&self, url: &Url, shown: &str) -> Result<T, FetchError> {
        let network = |source: reqwest::Error| FetchError::Network {
            url: shown.to_string(),
            source: source.without_url(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(network)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: shown.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: shown.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(network)?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: shown.to_string(),
            source,
        })
    }

    /// Looks up summoners by name
    ///
    /// At most [`MAX_SUMMONERS_PER_QUERY`] names per call. Names the API does
    /// not know are silently absent from the result.
    pub async fn summoners_by_name(&mut self, names: &[String]) -> Result<Vec<Summoner>, FetchError> {
        check_batch(names.len())?;
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let endpoint = self.endpoints.summoners_by_name(names);
        self.fetch_summoners(&endpoint).await
    }

    /// Looks up summoners by id
    ///
    /// At most [`MAX_SUMMONERS_PER_QUERY`] ids per call.
    pub async fn summoners_by_id(&mut self, ids: &[i64]) -> Result<Vec<Summoner>, FetchError> {
        check_batch(ids.len())?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let endpoint = self.endpoints.summoners_by_id(ids);
        self.fetch_summoners(&endpoint).await
    }

    async fn fetch_summoners(&mut self, endpoint: &Url) -> Result<Vec<Summoner>, FetchError> {
        let by_key: HashMap<String, Summoner> = self.fetch(endpoint, &[]).await?;
        let mut summoners: Vec<Summoner> = by_key.into_values().collect();
        summoners.sort_by_key(|s| s.id);
        Ok(summoners)
    }

    /// Fetches the full details of one match
    pub async fn match_detail(&mut self, match_id: i64) -> Result<MatchDetail, FetchError> {
        let endpoint = self.endpoints.match_detail(match_id);
        self.fetch(&endpoint, &[]).await
    }

    /// Fetches one page of a summoner's match history
    ///
    /// # Returns
    ///
    /// The match ids on the page starting at `begin_index`; empty past the
    /// end of the history.
    pub async fn match_history(
        &mut self,
        summoner_id: i64,
        begin_index: u32,
    ) -> Result<Vec<i64>, FetchError> {
        let endpoint = self.endpoints.match_history(summoner_id);
        let history: MatchHistory = self
            .fetch(&endpoint, &[(BEGIN_INDEX_PARAM, begin_index.to_string())])
            .await?;
        Ok(history.match_ids())
    }
}

fn check_batch(count: usize) -> Result<(), FetchError> {
    if count > MAX_SUMMONERS_PER_QUERY {
        return Err(FetchError::TooManyIds {
            count,
            max: MAX_SUMMONERS_PER_QUERY,
        });
    }
    Ok(())
}
