//! # GraphQL Input Types
//!
//! Input object definitions for mutations and queries, with their
//! conversions into domain inputs. Range and ordering checks are left to the
//! domain so every violated field is reported together.

use async_graphql::{ID, InputObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::enums::*;
use crate::error::ApiResult;
use drone_domain as domain;
use drone_operations::MissionFilter;

/// Parse a GraphQL ID as a UUID
pub fn parse_id(id: &ID) -> ApiResult<Uuid> {
    Ok(Uuid::parse_str(id.as_str())?)
}

// =============================================================================
// COORDINATE INPUTS
// =============================================================================

/// Geographic point input
#[derive(Debug, Clone, Copy, InputObject)]
pub struct GeoPointInput {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl From<GeoPointInput> for domain::GeoPoint {
    fn from(p: GeoPointInput) -> Self {
        Self::new(p.latitude, p.longitude)
    }
}

/// Mission start and end points
#[derive(Debug, Clone, Copy, InputObject)]
pub struct MissionCoordinatesInput {
    pub start: GeoPointInput,
    pub end: GeoPointInput,
}

impl From<MissionCoordinatesInput> for domain::MissionCoordinates {
    fn from(c: MissionCoordinatesInput) -> Self {
        Self {
            start: c.start.into(),
            end: c.end.into(),
        }
    }
}

// =============================================================================
// DRONE INPUTS
// =============================================================================

/// Input for registering a drone
#[derive(Debug, Clone, InputObject)]
pub struct RegisterDroneInput {
    pub name: String,
    pub model: String,
    /// Defaults to IDLE
    pub status: Option<DroneStatus>,
    /// Battery percentage (0-100), defaults to 100
    pub battery_level: Option<f64>,
    /// Maximum flight time in minutes, defaults to 30
    pub max_flight_time: Option<f64>,
}

impl From<RegisterDroneInput> for domain::NewDrone {
    fn from(input: RegisterDroneInput) -> Self {
        Self {
            name: input.name,
            model: input.model,
            status: input.status.map(Into::into),
            battery_level: input.battery_level,
            max_flight_time: input.max_flight_time,
        }
    }
}

/// Partial drone update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, InputObject)]
pub struct UpdateDroneInput {
    pub name: Option<String>,
    pub model: Option<String>,
    pub status: Option<DroneStatus>,
    pub battery_level: Option<f64>,
    pub max_flight_time: Option<f64>,
}

impl From<UpdateDroneInput> for domain::DronePatch {
    fn from(input: UpdateDroneInput) -> Self {
        Self {
            name: input.name,
            model: input.model,
            status: input.status.map(Into::into),
            battery_level: input.battery_level,
            max_flight_time: input.max_flight_time,
        }
    }
}

// =============================================================================
// MISSION INPUTS
// =============================================================================

/// Input for scheduling a mission
#[derive(Debug, Clone, InputObject)]
pub struct ScheduleMissionInput {
    /// Drone that will fly the mission
    pub drone_id: ID,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Must be after `startTime`
    pub end_time: DateTime<Utc>,
    #[graphql(default_with = "MissionType::Other")]
    pub mission_type: MissionType,
    #[graphql(default_with = "Priority::Medium")]
    pub priority: Priority,
    pub coordinates: MissionCoordinatesInput,
}

impl ScheduleMissionInput {
    pub fn into_domain(self) -> ApiResult<domain::NewMission> {
        Ok(domain::NewMission {
            drone_id: parse_id(&self.drone_id)?,
            name: self.name,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            mission_type: self.mission_type.into(),
            priority: self.priority.into(),
            coordinates: self.coordinates.into(),
        })
    }
}

/// Partial mission update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, InputObject)]
pub struct UpdateMissionInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<MissionStatus>,
    pub mission_type: Option<MissionType>,
    pub priority: Option<Priority>,
    pub coordinates: Option<MissionCoordinatesInput>,
}

impl From<UpdateMissionInput> for domain::MissionPatch {
    fn from(input: UpdateMissionInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            start_time: input.start_time,
            end_time: input.end_time,
            status: input.status.map(Into::into),
            mission_type: input.mission_type.map(Into::into),
            priority: input.priority.map(Into::into),
            coordinates: input.coordinates.map(Into::into),
        }
    }
}

/// Mission list filter; all criteria are optional and combined with AND
#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct MissionFilterInput {
    pub status: Option<MissionStatus>,
    pub mission_type: Option<MissionType>,
    pub priority: Option<Priority>,
}

impl From<MissionFilterInput> for MissionFilter {
    fn from(f: MissionFilterInput) -> Self {
        Self {
            status: f.status.map(Into::into),
            mission_type: f.mission_type.map(Into::into),
            priority: f.priority.map(Into::into),
        }
    }
}

// =============================================================================
// TELEMETRY INPUTS
// =============================================================================

/// A single telemetry reading
#[derive(Debug, Clone, InputObject)]
pub struct TelemetryInput {
    pub drone_id: ID,
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters, defaults to 0
    pub altitude: Option<f64>,
    /// Battery percentage (0-100)
    pub battery: f64,
    /// Speed in meters per second, defaults to 0
    pub speed: Option<f64>,
    /// Heading in degrees (0-360), defaults to 0
    pub heading: Option<f64>,
    /// Signal strength percentage, defaults to 100
    pub signal_strength: Option<f64>,
    /// Reading time, defaults to the time of ingestion
    pub timestamp: Option<DateTime<Utc>>,
    pub mission_id: Option<ID>,
}

impl TelemetryInput {
    pub fn into_domain(self) -> ApiResult<domain::NewTelemetry> {
        Ok(domain::NewTelemetry {
            drone_id: parse_id(&self.drone_id)?,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            battery: self.battery,
            speed: self.speed,
            heading: self.heading,
            signal_strength: self.signal_strength,
            timestamp: self.timestamp,
            mission_id: self.mission_id.as_ref().map(parse_id).transpose()?,
        })
    }
}
