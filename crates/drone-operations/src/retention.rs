//! Telemetry retention sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::broadcast;
use tokio::time::{MissedTickBehavior, interval};

use crate::clock::SharedClock;
use crate::error::OpsResult;
use drone_domain::ValidationErrors;
use drone_persistence::{SharedTelemetryCache, TelemetryRepository};

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

pub struct RetentionSweeper {
    telemetry: Arc<dyn TelemetryRepository>,
    cache: SharedTelemetryCache,
    clock: SharedClock,
    retention_days: u32,
}

impl RetentionSweeper {
    pub fn new(
        telemetry: Arc<dyn TelemetryRepository>,
        cache: SharedTelemetryCache,
        clock: SharedClock,
        retention_days: u32,
    ) -> Self {
        Self {
            telemetry,
            cache,
            clock,
            retention_days,
        }
    }

    pub const fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Delete samples older than the configured retention.
    pub async fn sweep(&self) -> OpsResult<u64> {
        self.sweep_older_than(self.retention_days).await
    }

    /// Delete samples recorded more than `days` ago; returns how many were
    /// removed from the store. Cached latest samples past the cutoff go too.
    pub async fn sweep_older_than(&self, days: u32) -> OpsResult<u64> {
        let cutoff = TimeDelta::try_days(i64::from(days))
            .and_then(|age| self.clock.now().checked_sub_signed(age))
            .ok_or_else(|| {
                let mut errors = ValidationErrors::default();
                errors.push("days", format!("retention of {days} days is out of range"));
                errors
            })?;

        let deleted = self.telemetry.delete_older_than(cutoff).await?;
        let evicted = self.cache.evict_older_than(cutoff).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Cache eviction failed during retention sweep");
            0
        });
        tracing::info!(deleted, evicted, days, cutoff = %cutoff, "Telemetry retention sweep");
        Ok(deleted)
    }

    /// Sweep every `every` until `shutdown` fires.
    pub async fn run(self: Arc<Self>, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Retention sweep loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep().await {
                        tracing::warn!(error = %err, "Retention sweep failed");
                    }
                }
            }
        }
    }
}
