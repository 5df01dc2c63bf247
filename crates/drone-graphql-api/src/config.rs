//! # API Configuration
//!
//! Environment-based configuration for the GraphQL API service.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use drone_persistence::ReadStrategy;

/// Configuration value that could not be used
#[derive(Debug, Error)]
#[error("Invalid {key}={value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Serve GraphQL Playground on `GET /graphql`
    pub enable_playground: bool,

    /// Maximum query depth
    pub max_query_depth: usize,

    /// Maximum query complexity
    pub max_query_complexity: usize,

    /// Logging level used when `RUST_LOG` is unset
    pub log_level: String,

    /// CORS allowed origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Telemetry older than this many days is purged
    pub telemetry_retention_days: u32,

    /// Period of the background retention sweep
    pub retention_sweep_interval: Duration,

    /// Inbox capacity of each telemetry subscriber
    pub subscriber_buffer: usize,

    /// How `latestTelemetry` consults the cache
    pub telemetry_read_strategy: ReadStrategy,

    /// Redis latest-telemetry cache; in-memory cache when unset
    pub redis_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_addr: parsed("SERVER_ADDR", &var("SERVER_ADDR", "0.0.0.0:8080"))?,
            enable_playground: flag("ENABLE_PLAYGROUND", &var("ENABLE_PLAYGROUND", "true"))?,
            max_query_depth: parsed("MAX_QUERY_DEPTH", &var("MAX_QUERY_DEPTH", "10"))?,
            max_query_complexity: parsed(
                "MAX_QUERY_COMPLEXITY",
                &var("MAX_QUERY_COMPLEXITY", "1000"),
            )?,
            log_level: var("LOG_LEVEL", "info"),
            cors_origins: var("CORS_ORIGINS", "*")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            telemetry_retention_days: parsed(
                "TELEMETRY_RETENTION_DAYS",
                &var("TELEMETRY_RETENTION_DAYS", "30"),
            )?,
            retention_sweep_interval: Duration::from_secs(positive(
                "RETENTION_SWEEP_INTERVAL_SECS",
                &var("RETENTION_SWEEP_INTERVAL_SECS", "3600"),
            )?),
            subscriber_buffer: positive("SUBSCRIBER_BUFFER", &var("SUBSCRIBER_BUFFER", "256"))?,
            telemetry_read_strategy: parsed(
                "TELEMETRY_READ_STRATEGY",
                &var("TELEMETRY_READ_STRATEGY", "cache-first"),
            )?,
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}

fn parsed<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let n: T = parsed(key, value)?;
    if n == T::default() {
        return Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(n)
}

fn flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
