use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so the only failure mode is a value that
/// does not parse.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("MUNCH_ENV", "development"))?;
    let bind_addr = parse_var(&or_default, "MUNCH_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("MUNCH_LOG_LEVEL", "info");

    let fetch_timeout_secs = parse_var(&or_default, "MUNCH_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_user_agent = or_default("MUNCH_FETCH_USER_AGENT", "munch/0.1 (feed-reader)");
    let fetch_max_retries = parse_var(&or_default, "MUNCH_FETCH_MAX_RETRIES", "2")?;
    let fetch_retry_backoff_base_secs =
        parse_var(&or_default, "MUNCH_FETCH_RETRY_BACKOFF_BASE_SECS", "1")?;
    let fetch_max_body_bytes = parse_var(&or_default, "MUNCH_FETCH_MAX_BODY_BYTES", "5242880")?;

    let feed_cache_limit = parse_var(&or_default, "MUNCH_FEED_CACHE_LIMIT", "500")?;
    let feed_cache_ttl_secs = parse_var(&or_default, "MUNCH_FEED_CACHE_TTL_SECS", "600")?;

    if fetch_max_body_bytes == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MUNCH_FETCH_MAX_BODY_BYTES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if feed_cache_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MUNCH_FEED_CACHE_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        fetch_timeout_secs,
        fetch_user_agent,
        fetch_max_retries,
        fetch_retry_backoff_base_secs,
        fetch_max_body_bytes,
        feed_cache_limit,
        feed_cache_ttl_secs,
    })
}

fn parse_var<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Fn(&str, &str) -> String,
{
    or_default(var, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MUNCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
