//! # GraphQL Output Types
//!
//! Object type definitions for GraphQL responses.

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, ErrorExtensions, ID, Result, SimpleObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::enums::*;
use crate::context::ApiContext;
use crate::error::IntoGraphQL;
use crate::loaders::DroneLoader;
use drone_domain as domain;

fn id(uuid: Uuid) -> ID {
    ID(uuid.to_string())
}

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<domain::GeoPoint> for GeoPoint {
    fn from(p: domain::GeoPoint) -> Self {
        Self {
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

/// Mission start and end points
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct MissionCoordinates {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl From<domain::MissionCoordinates> for MissionCoordinates {
    fn from(c: domain::MissionCoordinates) -> Self {
        Self {
            start: c.start.into(),
            end: c.end.into(),
        }
    }
}

// =============================================================================
// DRONE TYPES
// =============================================================================

/// A registered drone
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Drone {
    pub id: ID,
    pub name: String,
    pub model: String,
    pub status: DroneStatus,
    /// Battery percentage (0-100)
    pub battery_level: f64,
    /// Maximum flight time in minutes
    pub max_flight_time: f64,
    /// Position from the most recent telemetry
    pub current_location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

#[ComplexObject]
impl Drone {
    /// Missions assigned to this drone, by start time
    async fn missions(&self, ctx: &Context<'_>) -> Result<Vec<Mission>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let missions = api_ctx.ops.scheduler.for_drone(self.uuid).await.gql()?;
        Ok(missions.into_iter().map(Mission::from).collect())
    }
}

impl From<domain::Drone> for Drone {
    fn from(d: domain::Drone) -> Self {
        Self {
            id: id(d.id),
            name: d.name,
            model: d.model,
            status: d.status.into(),
            battery_level: d.battery_level,
            max_flight_time: d.max_flight_time,
            current_location: d.current_location.map(Into::into),
            created_at: d.created_at,
            updated_at: d.updated_at,
            uuid: d.id,
        }
    }
}

// =============================================================================
// MISSION TYPES
// =============================================================================

/// A scheduled unit of work for one drone
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Mission {
    pub id: ID,
    pub drone_id: ID,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: MissionStatus,
    pub mission_type: MissionType,
    pub priority: Priority,
    pub coordinates: MissionCoordinates,
    /// Scheduled length in whole minutes
    pub duration_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub drone_uuid: Uuid,
}

#[ComplexObject]
impl Mission {
    /// Drone assigned to the mission; null if it has since been removed
    async fn drone(&self, ctx: &Context<'_>) -> Result<Option<Drone>> {
        let loader = ctx.data::<DataLoader<DroneLoader>>()?;
        let drone = loader
            .load_one(self.drone_uuid)
            .await
            .map_err(|e| e.extend())?;
        Ok(drone.map(Drone::from))
    }
}

impl From<domain::Mission> for Mission {
    fn from(m: domain::Mission) -> Self {
        Self {
            duration_minutes: m.duration_minutes(),
            id: id(m.id),
            drone_id: id(m.drone_id),
            name: m.name,
            description: m.description,
            start_time: m.start_time,
            end_time: m.end_time,
            status: m.status.into(),
            mission_type: m.mission_type.into(),
            priority: m.priority.into(),
            coordinates: m.coordinates.into(),
            created_at: m.created_at,
            updated_at: m.updated_at,
            drone_uuid: m.drone_id,
        }
    }
}

// =============================================================================
// TELEMETRY TYPES
// =============================================================================

/// One telemetry reading
#[derive(Debug, Clone, SimpleObject)]
pub struct TelemetrySample {
    pub id: ID,
    pub drone_id: ID,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
    /// Percent (0-100)
    pub battery: f64,
    /// Meters per second
    pub speed: f64,
    /// Degrees (0-360)
    pub heading: f64,
    pub signal_strength: f64,
    pub timestamp: DateTime<Utc>,
    pub mission_id: Option<ID>,
}

impl From<domain::TelemetrySample> for TelemetrySample {
    fn from(s: domain::TelemetrySample) -> Self {
        Self {
            id: id(s.id),
            drone_id: id(s.drone_id),
            latitude: s.latitude,
            longitude: s.longitude,
            altitude: s.altitude,
            battery: s.battery,
            speed: s.speed,
            heading: s.heading,
            signal_strength: s.signal_strength,
            timestamp: s.timestamp,
            mission_id: s.mission_id.map(id),
        }
    }
}

/// Aggregates over a drone's recent telemetry
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct TelemetryStats {
    pub avg_battery: f64,
    pub avg_speed: f64,
    pub avg_altitude: f64,
    /// Kilometers flown between consecutive samples
    pub total_distance: f64,
    pub data_points: u32,
}

impl From<domain::TelemetryStats> for TelemetryStats {
    fn from(s: domain::TelemetryStats) -> Self {
        Self {
            avg_battery: s.avg_battery,
            avg_speed: s.avg_speed,
            avg_altitude: s.avg_altitude,
            total_distance: s.total_distance,
            data_points: u32::try_from(s.data_points).unwrap_or(u32::MAX),
        }
    }
}

/// Outcome of a telemetry purge
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct PurgeResult {
    /// Samples removed
    pub deleted: u64,
    /// Samples older than this were removed
    pub older_than_days: u32,
}
