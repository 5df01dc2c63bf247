//! # Drone Operations
//!
//! Core services for drone mission operations:
//!
//! - [`MissionScheduler`]: conflict-checked mission lifecycle with the
//!   mission → drone status side effect
//! - [`TelemetryService`]: ingestion, live position updates, per-drone fan-out
//!   and history/statistics queries
//! - [`FleetService`]: drone registration and fleet queries
//! - [`RetentionSweeper`]: periodic telemetry purge
//!
//! All services share one [`DroneLocks`] so that every check-then-write on a
//! drone is serialized, and one [`Clock`].
//!
//! ```rust,ignore
//! let ops = Operations::builder().subscriber_buffer(64).build();
//! let drone = ops.fleet.register(NewDrone::new("Kestrel", "M300")).await?;
//! let mission = ops.scheduler.schedule(input).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod channels;
pub mod clock;
pub mod error;
pub mod fleet;
pub mod locks;
pub mod retention;
pub mod scheduler;
pub mod telemetry;

use std::sync::Arc;

pub use channels::{ChannelRegistry, DEFAULT_SUBSCRIBER_BUFFER, Subscriber, TelemetryEvent};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{OpsError, OpsResult};
pub use fleet::FleetService;
pub use locks::{DroneGuard, DroneLocks};
pub use retention::{DEFAULT_RETENTION_DAYS, RetentionSweeper};
pub use scheduler::{MissionFilter, MissionScheduler};
pub use telemetry::TelemetryService;

use drone_persistence::{
    DroneRepository, MemoryDroneRepository, MemoryMissionRepository, MemoryTelemetryCache,
    MemoryTelemetryRepository, MissionRepository, ReadStrategy, SharedTelemetryCache,
    TelemetryRepository, WriteStrategy,
};

/// Every service wired to the same stores, locks, channels and clock.
#[derive(Clone)]
pub struct Operations {
    pub scheduler: Arc<MissionScheduler>,
    pub telemetry: Arc<TelemetryService>,
    pub fleet: Arc<FleetService>,
    pub retention: Arc<RetentionSweeper>,
    pub channels: ChannelRegistry,
}

impl Operations {
    pub fn builder() -> OperationsBuilder {
        OperationsBuilder::default()
    }
}

/// Builder for [`Operations`]. Unset stores default to the in-memory ones.
#[derive(Default)]
pub struct OperationsBuilder {
    drones: Option<Arc<dyn DroneRepository>>,
    missions: Option<Arc<dyn MissionRepository>>,
    telemetry: Option<Arc<dyn TelemetryRepository>>,
    cache: Option<SharedTelemetryCache>,
    clock: Option<SharedClock>,
    read_strategy: ReadStrategy,
    write_strategy: WriteStrategy,
    subscriber_buffer: Option<usize>,
    retention_days: Option<u32>,
}

impl OperationsBuilder {
    #[must_use]
    pub fn drones(mut self, drones: Arc<dyn DroneRepository>) -> Self {
        self.drones = Some(drones);
        self
    }

    #[must_use]
    pub fn missions(mut self, missions: Arc<dyn MissionRepository>) -> Self {
        self.missions = Some(missions);
        self
    }

    #[must_use]
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetryRepository>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: SharedTelemetryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub const fn read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.read_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn write_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.write_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn subscriber_buffer(mut self, buffer: usize) -> Self {
        self.subscriber_buffer = Some(buffer);
        self
    }

    #[must_use]
    pub const fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }

    pub fn build(self) -> Operations {
        let drones = self
            .drones
            .unwrap_or_else(|| Arc::new(MemoryDroneRepository::new()));
        let missions = self
            .missions
            .unwrap_or_else(|| Arc::new(MemoryMissionRepository::new()));
        let telemetry = self
            .telemetry
            .unwrap_or_else(|| Arc::new(MemoryTelemetryRepository::new()));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryTelemetryCache::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let locks = Arc::new(DroneLocks::new());
        let channels =
            ChannelRegistry::new(self.subscriber_buffer.unwrap_or(DEFAULT_SUBSCRIBER_BUFFER));

        Operations {
            scheduler: Arc::new(MissionScheduler::new(
                drones.clone(),
                missions,
                locks.clone(),
                clock.clone(),
            )),
            telemetry: Arc::new(
                TelemetryService::new(
                    drones.clone(),
                    telemetry.clone(),
                    cache.clone(),
                    channels.clone(),
                    locks.clone(),
                    clock.clone(),
                )
                .with_read_strategy(self.read_strategy)
                .with_write_strategy(self.write_strategy),
            ),
            fleet: Arc::new(FleetService::new(drones, locks, clock.clone())),
            retention: Arc::new(RetentionSweeper::new(
                telemetry,
                cache,
                clock,
                self.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
            )),
            channels,
        }
    }
}
