//! # GraphQL Enum Types
//!
//! Enum definitions for the GraphQL schema.

use async_graphql::Enum;
use drone_domain as domain;

/// Drone operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    /// On the ground and free for work
    Idle,
    /// Flying an in-progress mission
    InMission,
    /// Undergoing maintenance
    Maintenance,
    /// Not reachable
    Offline,
}

impl From<domain::DroneStatus> for DroneStatus {
    fn from(s: domain::DroneStatus) -> Self {
        match s {
            domain::DroneStatus::Idle => Self::Idle,
            domain::DroneStatus::InMission => Self::InMission,
            domain::DroneStatus::Maintenance => Self::Maintenance,
            domain::DroneStatus::Offline => Self::Offline,
        }
    }
}

impl From<DroneStatus> for domain::DroneStatus {
    fn from(s: DroneStatus) -> Self {
        match s {
            DroneStatus::Idle => Self::Idle,
            DroneStatus::InMission => Self::InMission,
            DroneStatus::Maintenance => Self::Maintenance,
            DroneStatus::Offline => Self::Offline,
        }
    }
}

/// Mission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl From<domain::MissionStatus> for MissionStatus {
    fn from(s: domain::MissionStatus) -> Self {
        match s {
            domain::MissionStatus::Scheduled => Self::Scheduled,
            domain::MissionStatus::InProgress => Self::InProgress,
            domain::MissionStatus::Completed => Self::Completed,
            domain::MissionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<MissionStatus> for domain::MissionStatus {
    fn from(s: MissionStatus) -> Self {
        match s {
            MissionStatus::Scheduled => Self::Scheduled,
            MissionStatus::InProgress => Self::InProgress,
            MissionStatus::Completed => Self::Completed,
            MissionStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Kind of work a mission performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum MissionType {
    Surveillance,
    Delivery,
    Mapping,
    Inspection,
    Other,
}

impl From<domain::MissionType> for MissionType {
    fn from(t: domain::MissionType) -> Self {
        match t {
            domain::MissionType::Surveillance => Self::Surveillance,
            domain::MissionType::Delivery => Self::Delivery,
            domain::MissionType::Mapping => Self::Mapping,
            domain::MissionType::Inspection => Self::Inspection,
            domain::MissionType::Other => Self::Other,
        }
    }
}

impl From<MissionType> for domain::MissionType {
    fn from(t: MissionType) -> Self {
        match t {
            MissionType::Surveillance => Self::Surveillance,
            MissionType::Delivery => Self::Delivery,
            MissionType::Mapping => Self::Mapping,
            MissionType::Inspection => Self::Inspection,
            MissionType::Other => Self::Other,
        }
    }
}

/// Mission priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl From<domain::Priority> for Priority {
    fn from(p: domain::Priority) -> Self {
        match p {
            domain::Priority::Low => Self::Low,
            domain::Priority::Medium => Self::Medium,
            domain::Priority::High => Self::High,
            domain::Priority::Critical => Self::Critical,
        }
    }
}

impl From<Priority> for domain::Priority {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Low => Self::Low,
            Priority::Medium => Self::Medium,
            Priority::High => Self::High,
            Priority::Critical => Self::Critical,
        }
    }
}
