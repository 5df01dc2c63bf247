//! Operation error taxonomy

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use drone_analytics::AnalyticsError;
use drone_domain::{MissionStatus, ValidationErrors};
use drone_persistence::PersistenceError;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Drone {drone_id} already has mission {conflicting_mission_id} in this time slot")]
    Conflict {
        drone_id: Uuid,
        conflicting_mission_id: Uuid,
    },

    #[error("Cannot {action} mission {mission_id} with status {}", .status.as_str())]
    InvalidState {
        mission_id: Uuid,
        action: &'static str,
        status: MissionStatus,
    },

    #[error("Mission {mission_id} cannot start before {start_time}")]
    TooEarly {
        mission_id: Uuid,
        start_time: DateTime<Utc>,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] PersistenceError),
}

impl OpsError {
    pub const fn drone_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity_type: "Drone",
            id,
        }
    }

    pub const fn mission_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity_type: "Mission",
            id,
        }
    }
}

impl From<AnalyticsError> for OpsError {
    fn from(err: AnalyticsError) -> Self {
        let mut errors = ValidationErrors::default();
        errors.push("hours", err.to_string());
        Self::Validation(errors)
    }
}

pub type OpsResult<T> = Result<T, OpsError>;
