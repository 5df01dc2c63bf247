//! # Repository Traits
//!
//! Abstract repository interfaces for domain entities.
//! Implementations can be swapped for different backends (in-memory, mock, etc.)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::repository::query::MissionQuery;
use drone_domain::{Drone, DroneStatus, GeoPoint, Mission, TelemetrySample, TimeRange};

// =============================================================================
// DRONE REPOSITORY
// =============================================================================

/// Repository for Drone entity operations
#[async_trait]
pub trait DroneRepository: Send + Sync {
    /// Get drone by ID
    async fn get_by_id(&self, drone_id: Uuid) -> Result<Option<Drone>>;

    /// Whether a drone with this ID is registered
    async fn exists(&self, drone_id: Uuid) -> Result<bool> {
        Ok(self.get_by_id(drone_id).await?.is_some())
    }

    /// Get all drones, oldest registration first
    async fn list(&self) -> Result<Vec<Drone>>;

    /// Get drones by status
    async fn get_by_status(&self, status: DroneStatus) -> Result<Vec<Drone>>;

    /// Create a new drone
    async fn create(&self, drone: &Drone) -> Result<()>;

    /// Replace a stored drone
    async fn update(&self, drone: &Drone) -> Result<()>;

    /// Set drone status, stamping `updated_at`. Returns `false` if the drone
    /// is not registered.
    async fn set_status(
        &self,
        drone_id: Uuid,
        status: DroneStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Record last known position and battery. Returns `false` if the drone
    /// is not registered.
    async fn set_location_and_battery(
        &self,
        drone_id: Uuid,
        location: GeoPoint,
        battery_level: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Delete drone, returning the removed record
    async fn delete(&self, drone_id: Uuid) -> Result<Option<Drone>>;
}

// =============================================================================
// MISSION REPOSITORY
// =============================================================================

/// Repository for Mission entity operations
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Get mission by ID
    async fn get_by_id(&self, mission_id: Uuid) -> Result<Option<Mission>>;

    /// Find missions matching `query`, sorted by start time ascending
    async fn find(&self, query: &MissionQuery) -> Result<Vec<Mission>>;

    /// Create a new mission
    async fn create(&self, mission: &Mission) -> Result<()>;

    /// Replace a stored mission
    async fn update(&self, mission: &Mission) -> Result<()>;

    /// Delete mission, returning the removed record
    async fn delete(&self, mission_id: Uuid) -> Result<Option<Mission>>;
}

// =============================================================================
// TELEMETRY REPOSITORY
// =============================================================================

/// Repository for Telemetry sample operations (append-only)
#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Insert telemetry record
    async fn insert(&self, sample: &TelemetrySample) -> Result<()>;

    /// Get telemetry for a drone within a time range, oldest first
    async fn get_by_drone_range(
        &self,
        drone_id: Uuid,
        range: TimeRange,
    ) -> Result<Vec<TelemetrySample>>;

    /// Get telemetry for a drone at or after `since`, oldest first
    async fn get_by_drone_since(
        &self,
        drone_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<TelemetrySample>>;

    /// Get the most recent samples for a drone, newest first
    async fn get_recent(&self, drone_id: Uuid, limit: usize) -> Result<Vec<TelemetrySample>>;

    /// Get latest telemetry for a drone
    async fn get_latest(&self, drone_id: Uuid) -> Result<Option<TelemetrySample>> {
        Ok(self.get_recent(drone_id, 1).await?.into_iter().next())
    }

    /// Delete every sample recorded strictly before `cutoff`; returns the count
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
