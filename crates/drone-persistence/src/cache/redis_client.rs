//! # Redis Cache Layer
//!
//! Redis client wrapper holding the latest telemetry sample per drone.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::TelemetryCache;
use crate::error::Result;
use drone_domain::TelemetrySample;

/// Redis cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
    /// Expiry of the latest-telemetry key; a drone that stops reporting
    /// falls back to the store after this long.
    pub telemetry_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            telemetry_ttl: Duration::from_secs(10),
        }
    }
}

impl CacheConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

const LATEST_PREFIX: &str = "telemetry:latest:";

fn latest_key(drone_id: Uuid) -> String {
    format!("{LATEST_PREFIX}{drone_id}")
}

/// Redis cache client over a multiplexed, auto-reconnecting connection
#[derive(Clone)]
pub struct CacheClient {
    conn: ConnectionManager,
    config: CacheConfig,
}

impl CacheClient {
    /// Connect to Redis
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Redis` if the URL is invalid or the server
    /// is unreachable.
    pub async fn new(config: CacheConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(url = %config.url, "Connected to Redis");

        Ok(Self { conn, config })
    }

    /// Get a JSON value from cache
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Set a JSON value in cache with TTL
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)?;
        let _: () = conn.set_ex(key, json, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl TelemetryCache for CacheClient {
    async fn get_latest(&self, drone_id: Uuid) -> Result<Option<TelemetrySample>> {
        self.get_json(&latest_key(drone_id)).await
    }

    // Not atomic across processes; ingestion for one drone is serialized
    // within a process.
    async fn set_latest(&self, sample: &TelemetrySample) -> Result<()> {
        let key = latest_key(sample.drone_id);
        if let Some(cached) = self.get_json::<TelemetrySample>(&key).await? {
            if cached.timestamp > sample.timestamp {
                return Ok(());
            }
        }
        self.set_json(&key, sample, self.config.telemetry_ttl).await
    }

    async fn invalidate(&self, drone_id: Uuid) -> Result<()> {
        self.delete(&latest_key(drone_id)).await.map(|_| ())
    }

    async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut keys = Vec::new();
        {
            let mut conn = self.conn.clone();
            let mut iter = conn
                .scan_match::<_, String>(format!("{LATEST_PREFIX}*"))
                .await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut evicted = 0;
        for key in keys {
            let Some(cached) = self.get_json::<TelemetrySample>(&key).await? else {
                continue;
            };
            if cached.timestamp < cutoff && self.delete(&key).await? {
                evicted += 1;
            }
        }
        Ok(evicted)
    }
}
