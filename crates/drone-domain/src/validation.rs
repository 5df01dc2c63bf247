//! Field-level input validation.
//!
//! Checks accumulate into [`ValidationErrors`] so callers see every violated
//! field at once rather than only the first.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single violated field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found while checking one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Names of the violated fields, in check order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub(crate) fn check_required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{field} is required"));
        }
    }

    pub(crate) fn check_max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().chars().count() > max {
            self.push(field, format!("{field} cannot exceed {max} characters"));
        }
    }

    pub(crate) fn check_range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() || value < min || value > max {
            self.push(field, format!("{field} must be between {min} and {max}"));
        }
    }

    pub(crate) fn check_min(&mut self, field: &str, value: f64, min: f64) {
        if !value.is_finite() || value < min {
            self.push(field, format!("{field} cannot be less than {min}"));
        }
    }

    pub(crate) fn check_ordered(&mut self, field: &str, start: DateTime<Utc>, end: DateTime<Utc>) {
        if end <= start {
            self.push(field, "end_time must be after start_time");
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, v) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} ({})", v.message, v.field)?;
        }
        Ok(())
    }
}
