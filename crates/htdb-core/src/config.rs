use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let base_url = or_default("HTDB_BASE_URL", "https://htreviews.org");

    let env = parse_environment(&or_default("HTDB_ENV", "development"));
    let log_level = or_default("HTDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("HTDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HTDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HTDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("HTDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("HTDB_SCRAPER_USER_AGENT", "htdb/0.1 (catalog-aggregator)");
    let scraper_page_size = parse_u32("HTDB_SCRAPER_PAGE_SIZE", "25")?;
    let scraper_inter_request_delay_ms = parse_u64("HTDB_SCRAPER_INTER_REQUEST_DELAY_MS", "250")?;
    let scraper_http_max_retries = parse_u32("HTDB_SCRAPER_HTTP_MAX_RETRIES", "2")?;
    let scraper_http_backoff_base_secs = parse_u64("HTDB_SCRAPER_HTTP_BACKOFF_BASE_SECS", "5")?;

    let scraper_max_concurrent_brands = parse_usize("HTDB_SCRAPER_MAX_CONCURRENT_BRANDS", "1")?;
    let scraper_max_concurrent_products = parse_usize("HTDB_SCRAPER_MAX_CONCURRENT_PRODUCTS", "1")?;
    let scraper_checkpoint_interval = parse_u64("HTDB_SCRAPER_CHECKPOINT_INTERVAL", "1")?;
    let scraper_job_max_retries = parse_u32("HTDB_SCRAPER_JOB_MAX_RETRIES", "3")?;
    let scraper_job_retry_delay_ms = parse_u64("HTDB_SCRAPER_JOB_RETRY_DELAY_MS", "0")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        base_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_page_size,
        scraper_inter_request_delay_ms,
        scraper_http_max_retries,
        scraper_http_backoff_base_secs,
        scraper_max_concurrent_brands,
        scraper_max_concurrent_products,
        scraper_checkpoint_interval,
        scraper_job_max_retries,
        scraper_job_retry_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
