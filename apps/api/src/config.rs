use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::MAX_ATTEMPTS_CAP;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Enables the Redis change feed; without it, changes stay in-process.
    pub redis_url: Option<String>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub flow_timeout: Duration,
    pub llm_max_attempts: u32,
    pub subscription_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            flow_timeout: Duration::from_secs(parse_env("FLOW_TIMEOUT_SECS", 60)?),
            llm_max_attempts: parse_bounded_env("LLM_MAX_ATTEMPTS", 1, 1..=MAX_ATTEMPTS_CAP)?,
            subscription_ttl: Duration::from_secs(parse_env("HISTORY_SUBSCRIPTION_TTL_SECS", 300)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bounded_env(key: &str, default: u32, range: RangeInclusive<u32>) -> Result<u32> {
    let value = parse_env(key, default)?;
    if !range.contains(&value) {
        bail!(
            "Environment variable '{key}' must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}
