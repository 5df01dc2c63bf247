//! # API Error Types
//!
//! Maps operation failures onto GraphQL errors carrying `code` and `status`
//! extensions.

use async_graphql::{Error as GraphQLError, ErrorExtensions};
use axum::http::StatusCode;
use thiserror::Error;

use drone_domain::{FieldViolation, MissionStatus};
use drone_operations::OpsError;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Drone {drone_id} already has mission {conflicting_mission_id} in this time slot")]
    Conflict {
        drone_id: String,
        conflicting_mission_id: String,
    },

    #[error("Cannot {action} mission with status {}", .status.as_str())]
    InvalidState {
        action: &'static str,
        status: MissionStatus,
    },

    #[error("Mission cannot start before {start_time}")]
    TooEarly { start_time: String },

    #[error("Invalid UUID format: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Internal server error")]
    Internal,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// HTTP status equivalent of this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Validation(_)
            | Self::InvalidState { .. }
            | Self::TooEarly { .. }
            | Self::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code for GraphQL extensions
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::TooEarly { .. } => "TOO_EARLY",
            Self::InvalidUuid(_) => "INVALID_UUID",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<OpsError> for ApiError {
    fn from(err: OpsError) -> Self {
        match err {
            OpsError::NotFound { entity_type, id } => Self::NotFound {
                entity_type,
                id: id.to_string(),
            },
            OpsError::Validation(errors) => Self::Validation(errors.violations().to_vec()),
            OpsError::Conflict {
                drone_id,
                conflicting_mission_id,
            } => Self::Conflict {
                drone_id: drone_id.to_string(),
                conflicting_mission_id: conflicting_mission_id.to_string(),
            },
            OpsError::InvalidState { action, status, .. } => Self::InvalidState { action, status },
            OpsError::TooEarly { start_time, .. } => Self::TooEarly {
                start_time: start_time.to_rfc3339(),
            },
            OpsError::Internal(source) => {
                tracing::error!(error = %source, "Operation failed");
                Self::Internal
            }
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> GraphQLError {
        GraphQLError::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
            e.set("status", self.status_code().as_u16());

            match self {
                Self::NotFound { entity_type, id } => {
                    e.set("entity_type", *entity_type);
                    e.set("entity_id", id.as_str());
                }
                Self::Validation(violations) => {
                    e.set(
                        "fields",
                        violations
                            .iter()
                            .map(|v| v.field.clone())
                            .collect::<Vec<_>>(),
                    );
                }
                Self::Conflict {
                    conflicting_mission_id,
                    ..
                } => {
                    e.set("conflicting_mission_id", conflicting_mission_id.as_str());
                }
                _ => {}
            }
        })
    }
}

/// Lifts service results into GraphQL results with extensions attached
pub trait IntoGraphQL<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T, E> IntoGraphQL<T> for Result<T, E>
where
    E: Into<ApiError>,
{
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.into().extend())
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drone_domain::ValidationErrors;
    use drone_persistence::PersistenceError;
    use uuid::Uuid;

    #[test]
    fn test_ops_errors_map_to_codes() {
        let cases = [
            (OpsError::drone_not_found(Uuid::new_v4()), "NOT_FOUND", 404),
            (
                OpsError::Conflict {
                    drone_id: Uuid::new_v4(),
                    conflicting_mission_id: Uuid::new_v4(),
                },
                "CONFLICT",
                409,
            ),
            (
                OpsError::InvalidState {
                    mission_id: Uuid::new_v4(),
                    action: "start",
                    status: MissionStatus::Completed,
                },
                "INVALID_STATE",
                400,
            ),
            (
                OpsError::TooEarly {
                    mission_id: Uuid::new_v4(),
                    start_time: Utc::now(),
                },
                "TOO_EARLY",
                400,
            ),
            (
                OpsError::Validation(ValidationErrors::default()),
                "VALIDATION_ERROR",
                400,
            ),
        ];

        for (ops, code, status) in cases {
            let api = ApiError::from(ops);
            assert_eq!(api.error_code(), code);
            assert_eq!(api.status_code().as_u16(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let api = ApiError::from(OpsError::Internal(PersistenceError::Storage(
            "connection refused on 10.0.0.7".to_string(),
        )));
        assert_eq!(api.error_code(), "INTERNAL_ERROR");
        assert!(!api.to_string().contains("10.0.0.7"));
    }

    #[test]
    fn test_validation_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.push("name", "name is required");
        errors.push("battery", "battery must be between 0 and 100");

        let gql = ApiError::from(OpsError::Validation(errors)).extend();
        let ext = serde_json::to_value(gql.extensions.unwrap()).unwrap();
        assert_eq!(ext["code"], "VALIDATION_ERROR");
        assert_eq!(ext["fields"], serde_json::json!(["name", "battery"]));
        assert!(gql.message.contains("name is required"));
    }
}
