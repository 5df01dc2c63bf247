//! # Drone Mission Operations - Domain Model
//!
//! Core domain entities, value objects, and enums for drone fleet mission
//! scheduling and telemetry. These types are the single source of truth
//! across all layers: persistence, operations, and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod validation;

pub use validation::{FieldViolation, ValidationErrors};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Calculate great-circle distance to another point (Haversine formula)
    #[must_use]
    pub fn distance_to_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    pub(crate) fn check(&self, prefix: &str, errors: &mut ValidationErrors) {
        errors.check_range(&format!("{prefix}.latitude"), self.latitude, -90.0, 90.0);
        errors.check_range(&format!("{prefix}.longitude"), self.longitude, -180.0, 180.0);
    }
}

/// Planned start and end points of a mission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionCoordinates {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// Time range filter for queries (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Drone operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DroneStatus {
    #[default]
    Idle,
    InMission,
    Maintenance,
    Offline,
}

impl DroneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InMission => "in-mission",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
        }
    }
}

/// Mission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MissionStatus {
    /// Statuses that occupy the owning drone's time slot
    pub const OCCUPYING: [MissionStatus; 2] = [MissionStatus::Scheduled, MissionStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn occupies_slot(&self) -> bool {
        Self::OCCUPYING.contains(self)
    }
}

/// Mission types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionType {
    Surveillance,
    Delivery,
    Mapping,
    Inspection,
    #[default]
    Other,
}

/// Mission priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Drone status implied by a mission entering `status`.
///
/// Applied after every committed mission status write, including creation.
#[must_use]
pub const fn drone_status_for(status: MissionStatus) -> DroneStatus {
    match status {
        MissionStatus::Scheduled | MissionStatus::Completed | MissionStatus::Cancelled => {
            DroneStatus::Idle
        }
        MissionStatus::InProgress => DroneStatus::InMission,
    }
}

// =============================================================================
// DRONE
// =============================================================================

/// Drone entity - a registered airframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    pub status: DroneStatus,
    pub battery_level: f64,
    /// Minutes
    pub max_flight_time: f64,
    pub current_location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input for a drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDrone {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub status: Option<DroneStatus>,
    #[serde(default)]
    pub battery_level: Option<f64>,
    #[serde(default)]
    pub max_flight_time: Option<f64>,
}

impl NewDrone {
    pub const DEFAULT_BATTERY: f64 = 100.0;
    pub const DEFAULT_MAX_FLIGHT_TIME: f64 = 30.0;

    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            status: None,
            battery_level: None,
            max_flight_time: None,
        }
    }

    /// Check every field, reporting all violations at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_required("name", &self.name);
        errors.check_max_len("name", &self.name, 100);
        errors.check_required("model", &self.model);
        if let Some(battery) = self.battery_level {
            errors.check_range("battery_level", battery, 0.0, 100.0);
        }
        if let Some(minutes) = self.max_flight_time {
            errors.check_min("max_flight_time", minutes, 0.0);
        }
        errors.into_result()
    }

    pub fn into_drone(self, id: Uuid, now: DateTime<Utc>) -> Drone {
        Drone {
            id,
            name: self.name.trim().to_string(),
            model: self.model.trim().to_string(),
            status: self.status.unwrap_or_default(),
            battery_level: self.battery_level.unwrap_or(Self::DEFAULT_BATTERY),
            max_flight_time: self.max_flight_time.unwrap_or(Self::DEFAULT_MAX_FLIGHT_TIME),
            current_location: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a drone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DronePatch {
    pub name: Option<String>,
    pub model: Option<String>,
    pub status: Option<DroneStatus>,
    pub battery_level: Option<f64>,
    pub max_flight_time: Option<f64>,
}

impl DronePatch {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_required("name", name);
            errors.check_max_len("name", name, 100);
        }
        if let Some(model) = &self.model {
            errors.check_required("model", model);
        }
        if let Some(battery) = self.battery_level {
            errors.check_range("battery_level", battery, 0.0, 100.0);
        }
        if let Some(minutes) = self.max_flight_time {
            errors.check_min("max_flight_time", minutes, 0.0);
        }
        errors.into_result()
    }

    pub fn apply(self, drone: &mut Drone, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            drone.name = name.trim().to_string();
        }
        if let Some(model) = self.model {
            drone.model = model.trim().to_string();
        }
        if let Some(status) = self.status {
            drone.status = status;
        }
        if let Some(battery) = self.battery_level {
            drone.battery_level = battery;
        }
        if let Some(minutes) = self.max_flight_time {
            drone.max_flight_time = minutes;
        }
        drone.updated_at = now;
    }
}

// =============================================================================
// MISSION
// =============================================================================

/// Mission entity - a time-boxed assignment of one drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub drone_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: MissionStatus,
    pub mission_type: MissionType,
    pub priority: Priority,
    pub coordinates: MissionCoordinates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    /// Half-open overlap of `[start_time, end_time)` with `[start, end)`
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Planned duration in whole minutes, rounded up
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        let secs = (self.end_time - self.start_time).num_seconds();
        if secs <= 0 {
            return 0;
        }
        (secs + 59) / 60
    }
}

/// Scheduling input for a mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMission {
    pub drone_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub mission_type: MissionType,
    #[serde(default)]
    pub priority: Priority,
    pub coordinates: MissionCoordinates,
}

impl NewMission {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_required("name", &self.name);
        errors.check_max_len("name", &self.name, 200);
        if let Some(description) = &self.description {
            errors.check_max_len("description", description, 1000);
        }
        errors.check_ordered("end_time", self.start_time, self.end_time);
        self.coordinates.start.check("coordinates.start", &mut errors);
        self.coordinates.end.check("coordinates.end", &mut errors);
        errors.into_result()
    }

    pub fn into_mission(self, id: Uuid, now: DateTime<Utc>) -> Mission {
        Mission {
            id,
            drone_id: self.drone_id,
            name: self.name.trim().to_string(),
            description: self.description.map(|d| d.trim().to_string()),
            start_time: self.start_time,
            end_time: self.end_time,
            status: MissionStatus::Scheduled,
            mission_type: self.mission_type,
            priority: self.priority,
            coordinates: self.coordinates,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a mission. The owning drone is fixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<MissionStatus>,
    pub mission_type: Option<MissionType>,
    pub priority: Option<Priority>,
    pub coordinates: Option<MissionCoordinates>,
}

impl MissionPatch {
    #[must_use]
    pub fn touches_schedule(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    /// Field checks that do not need the stored mission.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_required("name", name);
            errors.check_max_len("name", name, 200);
        }
        if let Some(description) = &self.description {
            errors.check_max_len("description", description, 1000);
        }
        if let Some(coordinates) = &self.coordinates {
            coordinates.start.check("coordinates.start", &mut errors);
            coordinates.end.check("coordinates.end", &mut errors);
        }
        errors.into_result()
    }

    /// Start/end after merging with `mission`
    #[must_use]
    pub fn merged_schedule(&self, mission: &Mission) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start_time.unwrap_or(mission.start_time),
            self.end_time.unwrap_or(mission.end_time),
        )
    }

    /// The merged interval must still be non-empty.
    pub fn validate_against(&self, mission: &Mission) -> Result<(), ValidationErrors> {
        let (start, end) = self.merged_schedule(mission);
        let mut errors = ValidationErrors::default();
        errors.check_ordered("end_time", start, end);
        errors.into_result()
    }

    pub fn apply(self, mission: &mut Mission, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            mission.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            mission.description = Some(description.trim().to_string());
        }
        if let Some(start) = self.start_time {
            mission.start_time = start;
        }
        if let Some(end) = self.end_time {
            mission.end_time = end;
        }
        if let Some(status) = self.status {
            mission.status = status;
        }
        if let Some(mission_type) = self.mission_type {
            mission.mission_type = mission_type;
        }
        if let Some(priority) = self.priority {
            mission.priority = priority;
        }
        if let Some(coordinates) = self.coordinates {
            mission.coordinates = coordinates;
        }
        mission.updated_at = now;
    }
}

// =============================================================================
// TELEMETRY
// =============================================================================

/// Telemetry sample - immutable once stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub id: Uuid,
    pub drone_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub battery: f64,
    pub speed: f64,
    pub heading: f64,
    pub signal_strength: f64,
    pub timestamp: DateTime<Utc>,
    pub mission_id: Option<Uuid>,
}

impl TelemetrySample {
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Ingestion input for a telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTelemetry {
    pub drone_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    pub battery: f64,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub signal_strength: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mission_id: Option<Uuid>,
}

impl NewTelemetry {
    pub const DEFAULT_SIGNAL_STRENGTH: f64 = 100.0;

    pub fn new(drone_id: Uuid, latitude: f64, longitude: f64, battery: f64) -> Self {
        Self {
            drone_id,
            latitude,
            longitude,
            altitude: None,
            battery,
            speed: None,
            heading: None,
            signal_strength: None,
            timestamp: None,
            mission_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_range("latitude", self.latitude, -90.0, 90.0);
        errors.check_range("longitude", self.longitude, -180.0, 180.0);
        errors.check_range("battery", self.battery, 0.0, 100.0);
        if let Some(altitude) = self.altitude {
            errors.check_min("altitude", altitude, 0.0);
        }
        if let Some(speed) = self.speed {
            errors.check_min("speed", speed, 0.0);
        }
        if let Some(heading) = self.heading {
            errors.check_range("heading", heading, 0.0, 360.0);
        }
        if let Some(signal) = self.signal_strength {
            errors.check_range("signal_strength", signal, 0.0, 100.0);
        }
        errors.into_result()
    }

    pub fn into_sample(self, id: Uuid, now: DateTime<Utc>) -> TelemetrySample {
        TelemetrySample {
            id,
            drone_id: self.drone_id,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude.unwrap_or(0.0),
            battery: self.battery,
            speed: self.speed.unwrap_or(0.0),
            heading: self.heading.unwrap_or(0.0),
            signal_strength: self.signal_strength.unwrap_or(Self::DEFAULT_SIGNAL_STRENGTH),
            timestamp: self.timestamp.unwrap_or(now),
            mission_id: self.mission_id,
        }
    }
}

/// Windowed telemetry statistics for one drone
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub avg_battery: f64,
    pub avg_speed: f64,
    pub avg_altitude: f64,
    /// Kilometres
    pub total_distance: f64,
    pub data_points: usize,
}
