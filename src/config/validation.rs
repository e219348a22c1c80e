use crate::config::types::{
    ApiConfig, Config, CrawlConfig, FetchConfig, RateLimitConfig, StorageConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_storage_config(&config.storage)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates the API location
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.region.is_empty() || !config.region.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "region must be non-empty and alphanumeric, got '{}'",
            config.region
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates both request quotas
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.short_limit < 1 || config.long_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "rate limits must be >= 1, got short={} long={}",
            config.short_limit, config.long_limit
        )));
    }

    if config.short_window_secs < 1 || config.long_window_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "rate limit windows must be >= 1s, got short={}s long={}s",
            config.short_window_secs, config.long_window_secs
        )));
    }

    if config.long_window_secs < config.short_window_secs {
        return Err(ConfigError::Validation(format!(
            "long window ({}s) cannot be shorter than short window ({}s)",
            config.long_window_secs, config.short_window_secs
        )));
    }

    Ok(())
}

/// Validates retry behavior
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 || config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 20, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates crawl cycle tuning
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(
            "page_size must be >= 1".to_string(),
        ));
    }

    if config.recrawl_after_secs < 0 {
        return Err(ConfigError::Validation(format!(
            "recrawl_after_secs cannot be negative, got {}",
            config.recrawl_after_secs
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed summoner names
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        if seed.trim().is_empty() {
            return Err(ConfigError::Validation(
                "seed summoner names cannot be empty".to_string(),
            ));
        }

        if seed.contains(',') {
            return Err(ConfigError::Validation(format!(
                "seed summoner name '{}' cannot contain a comma",
                seed
            )));
        }
    }

    Ok(())
}
