//! # Telemetry Service
//!
//! Ingests samples, keeps each drone's live position current, fans samples
//! out to channel subscribers and answers history/statistics queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::channels::{ChannelRegistry, TelemetryEvent};
use crate::clock::SharedClock;
use crate::error::{OpsError, OpsResult};
use crate::locks::DroneLocks;
use drone_analytics::{DEFAULT_WINDOW_HOURS, TelemetryAggregator};
use drone_domain::{NewTelemetry, TelemetrySample, TelemetryStats, TimeRange};
use drone_persistence::{
    DroneRepository, PersistenceError, ReadStrategy, SharedTelemetryCache, TelemetryRepository,
    WriteStrategy,
};

/// Sample count returned by `recent` when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 100;

pub struct TelemetryService {
    drones: Arc<dyn DroneRepository>,
    telemetry: Arc<dyn TelemetryRepository>,
    cache: SharedTelemetryCache,
    channels: ChannelRegistry,
    locks: Arc<DroneLocks>,
    clock: SharedClock,
    read_strategy: ReadStrategy,
    write_strategy: WriteStrategy,
}

impl TelemetryService {
    pub fn new(
        drones: Arc<dyn DroneRepository>,
        telemetry: Arc<dyn TelemetryRepository>,
        cache: SharedTelemetryCache,
        channels: ChannelRegistry,
        locks: Arc<DroneLocks>,
        clock: SharedClock,
    ) -> Self {
        Self {
            drones,
            telemetry,
            cache,
            channels,
            locks,
            clock,
            read_strategy: ReadStrategy::default(),
            write_strategy: WriteStrategy::default(),
        }
    }

    #[must_use]
    pub const fn with_read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.read_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_write_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.write_strategy = strategy;
        self
    }

    pub const fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// Store a sample, update the drone's position and battery, then publish
    /// it on the drone's channel.
    #[tracing::instrument(skip(self, input), fields(drone_id = %input.drone_id))]
    pub async fn ingest(&self, input: NewTelemetry) -> OpsResult<TelemetrySample> {
        input.validate()?;
        let drone_id = input.drone_id;

        let _guard = self.locks.acquire(drone_id).await;
        if !self.drones.exists(drone_id).await? {
            return Err(OpsError::drone_not_found(drone_id));
        }
        let now = self.clock.now();
        let sample = input.into_sample(Uuid::new_v4(), now);

        let (telemetry, drones, cache, stored) = (&self.telemetry, &self.drones, &self.cache, &sample);
        self.write_strategy
            .write(
                move || async move {
                    telemetry.insert(stored).await?;
                    if !drones
                        .set_location_and_battery(drone_id, stored.position(), stored.battery, now)
                        .await?
                    {
                        tracing::warn!(drone_id = %drone_id, "Drone removed during ingest, position not updated");
                    }
                    Ok::<_, PersistenceError>(())
                },
                move || async move { cache.set_latest(stored).await },
                move || async move { cache.invalidate(drone_id).await },
            )
            .await?;

        let event = TelemetryEvent {
            drone_id,
            sample: sample.clone(),
        };
        let delivered = self.channels.publish(drone_id, &event);
        tracing::debug!(sample_id = %sample.id, delivered, "Telemetry ingested");

        Ok(sample)
    }

    /// Newest samples first
    pub async fn recent(&self, drone_id: Uuid, limit: Option<usize>) -> OpsResult<Vec<TelemetrySample>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        Ok(self.telemetry.get_recent(drone_id, limit).await?)
    }

    pub async fn latest(&self, drone_id: Uuid) -> OpsResult<Option<TelemetrySample>> {
        let (telemetry, cache) = (&self.telemetry, &self.cache);
        let latest = self
            .read_strategy
            .read(
                move || cache.get_latest(drone_id),
                move || telemetry.get_latest(drone_id),
                move |sample: TelemetrySample| async move { cache.set_latest(&sample).await },
            )
            .await?;
        Ok(latest)
    }

    /// Samples within `[start, end]`, oldest first
    pub async fn range(
        &self,
        drone_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> OpsResult<Vec<TelemetrySample>> {
        Ok(self
            .telemetry
            .get_by_drone_range(drone_id, TimeRange::new(start, end))
            .await?)
    }

    /// Statistics over the last `hours` (default 24)
    pub async fn stats(&self, drone_id: Uuid, hours: Option<u32>) -> OpsResult<TelemetryStats> {
        let since = TelemetryAggregator::window_start(
            self.clock.now(),
            hours.unwrap_or(DEFAULT_WINDOW_HOURS),
        )?;
        let samples = self.telemetry.get_by_drone_since(drone_id, since).await?;
        Ok(TelemetryAggregator::summarize(&samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use chrono::Duration;
    use drone_domain::{DroneStatus, GeoPoint, NewDrone};
    use drone_persistence::{
        MemoryDroneRepository, MemoryTelemetryCache, MemoryTelemetryRepository, TelemetryCache,
    };

    struct Harness {
        service: TelemetryService,
        drones: Arc<MemoryDroneRepository>,
        cache: Arc<MemoryTelemetryCache>,
        clock: Arc<ManualClock>,
        drone_id: Uuid,
    }

    async fn harness() -> Harness {
        let clock = Arc::new(ManualClock::default());
        let drones = Arc::new(MemoryDroneRepository::new());
        let cache = Arc::new(MemoryTelemetryCache::new());
        let drone = NewDrone::new("Falcon", "Matrice 350").into_drone(Uuid::new_v4(), clock.now());
        drones.create(&drone).await.unwrap();

        let service = TelemetryService::new(
            drones.clone(),
            Arc::new(MemoryTelemetryRepository::new()),
            cache.clone(),
            ChannelRegistry::new(16),
            Arc::new(DroneLocks::new()),
            clock.clone(),
        );
        Harness {
            service,
            drones,
            cache,
            clock,
            drone_id: drone.id,
        }
    }

    #[tokio::test]
    async fn test_ingest_updates_drone_and_publishes() {
        let h = harness().await;
        let mut sub = h.service.channels().register();
        h.service.channels().join(sub.id(), h.drone_id);
        h.clock.advance(Duration::minutes(3));

        let sample = h
            .service
            .ingest(NewTelemetry::new(h.drone_id, 40.7, -74.0, 64.0))
            .await
            .unwrap();

        let drone = h.drones.get_by_id(h.drone_id).await.unwrap().unwrap();
        assert_eq!(drone.current_location, Some(GeoPoint::new(40.7, -74.0)));
        assert_eq!(drone.battery_level, 64.0);
        assert_eq!(drone.status, DroneStatus::Idle);
        assert_eq!(drone.updated_at, h.clock.now());

        let event = sub.try_recv().unwrap();
        assert_eq!(event.sample, sample);
        assert_eq!(h.cache.get_latest(h.drone_id).await.unwrap(), Some(sample));
    }

    #[tokio::test]
    async fn test_ingest_unknown_drone_persists_nothing() {
        let h = harness().await;
        let stranger = Uuid::new_v4();
        let mut sub = h.service.channels().register();
        h.service.channels().join(sub.id(), stranger);

        let err = h
            .service
            .ingest(NewTelemetry::new(stranger, 0.0, 0.0, 50.0))
            .await
            .unwrap_err();

        assert!(matches!(err, OpsError::NotFound { entity_type: "Drone", .. }));
        assert!(h.service.recent(stranger, None).await.unwrap().is_empty());
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_ingest_rejects_out_of_range() {
        let h = harness().await;
        let err = h
            .service
            .ingest(NewTelemetry::new(h.drone_id, 91.0, 0.0, 101.0))
            .await
            .unwrap_err();

        let OpsError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["latitude", "battery"]);
    }

    #[tokio::test]
    async fn test_latest_falls_back_to_store_and_repopulates() {
        let h = harness().await;
        let sample = h
            .service
            .ingest(NewTelemetry::new(h.drone_id, 1.0, 1.0, 90.0))
            .await
            .unwrap();
        h.cache.invalidate(h.drone_id).await.unwrap();

        assert_eq!(h.service.latest(h.drone_id).await.unwrap(), Some(sample.clone()));
        assert_eq!(h.cache.get_latest(h.drone_id).await.unwrap(), Some(sample));
        assert_eq!(h.service.latest(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stats_window() {
        let h = harness().await;
        let now = h.clock.now();

        let mut stale = NewTelemetry::new(h.drone_id, 10.0, 10.0, 10.0);
        stale.timestamp = Some(now - Duration::hours(30));
        h.service.ingest(stale).await.unwrap();

        for (lat, battery) in [(0.0, 80.0), (1.0, 70.0)] {
            h.service
                .ingest(NewTelemetry::new(h.drone_id, lat, 0.0, battery))
                .await
                .unwrap();
        }

        let stats = h.service.stats(h.drone_id, None).await.unwrap();
        assert_eq!(stats.data_points, 2);
        assert_eq!(stats.avg_battery, 75.0);
        assert!((stats.total_distance - 111.19).abs() < 0.01);

        assert_eq!(h.service.stats(h.drone_id, Some(48)).await.unwrap().data_points, 3);
        assert_eq!(h.service.stats(Uuid::new_v4(), None).await.unwrap(), TelemetryStats::default());
        assert!(matches!(
            h.service.stats(h.drone_id, Some(0)).await.unwrap_err(),
            OpsError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_recent_and_range_ordering() {
        let h = harness().await;
        let t0 = h.clock.now();
        for minutes in 0..5 {
            let mut input = NewTelemetry::new(h.drone_id, 0.0, 0.0, 50.0);
            input.timestamp = Some(t0 + Duration::minutes(minutes));
            h.service.ingest(input).await.unwrap();
        }

        let recent = h.service.recent(h.drone_id, Some(2)).await.unwrap();
        assert_eq!(recent[0].timestamp, t0 + Duration::minutes(4));
        assert_eq!(recent[1].timestamp, t0 + Duration::minutes(3));

        let range = h
            .service
            .range(h.drone_id, t0 + Duration::minutes(1), t0 + Duration::minutes(3))
            .await
            .unwrap();
        let stamps: Vec<_> = range.iter().map(|s| s.timestamp).collect();
        assert_eq!(
            stamps,
            vec![t0 + Duration::minutes(1), t0 + Duration::minutes(2), t0 + Duration::minutes(3)]
        );
    }
}
