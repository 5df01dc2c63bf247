//! # Cache Module
//!
//! Latest-telemetry cache for the hot read path. The store stays the source
//! of truth; every cache method may fail or miss without losing data.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::Result;
use drone_domain::TelemetrySample;

#[cfg(feature = "redis")]
pub mod redis_client;

#[cfg(feature = "redis")]
pub use redis_client::{CacheClient, CacheConfig};

/// Most recent telemetry sample per drone
#[async_trait]
pub trait TelemetryCache: Send + Sync {
    async fn get_latest(&self, drone_id: Uuid) -> Result<Option<TelemetrySample>>;

    /// Store `sample` unless a newer sample for the same drone is cached
    async fn set_latest(&self, sample: &TelemetrySample) -> Result<()>;

    async fn invalidate(&self, drone_id: Uuid) -> Result<()>;

    /// Drop cached samples recorded before `cutoff`; returns how many.
    async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

pub type SharedTelemetryCache = Arc<dyn TelemetryCache>;

/// Process-local cache used when no Redis is configured
#[derive(Debug, Default)]
pub struct MemoryTelemetryCache {
    latest: DashMap<Uuid, TelemetrySample>,
}

impl MemoryTelemetryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TelemetryCache for MemoryTelemetryCache {
    async fn get_latest(&self, drone_id: Uuid) -> Result<Option<TelemetrySample>> {
        Ok(self.latest.get(&drone_id).map(|s| s.value().clone()))
    }

    async fn set_latest(&self, sample: &TelemetrySample) -> Result<()> {
        self.latest
            .entry(sample.drone_id)
            .and_modify(|cached| {
                if sample.timestamp >= cached.timestamp {
                    *cached = sample.clone();
                }
            })
            .or_insert_with(|| sample.clone());
        Ok(())
    }

    async fn invalidate(&self, drone_id: Uuid) -> Result<()> {
        self.latest.remove(&drone_id);
        Ok(())
    }

    async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let before = self.latest.len();
        self.latest.retain(|_, sample| sample.timestamp >= cutoff);
        Ok((before - self.latest.len()) as u64)
    }
}
