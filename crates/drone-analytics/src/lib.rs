//! # Drone Analytics
//!
//! Windowed telemetry statistics for a single drone.
//!
//! ## Features
//!
//! - Mean battery, speed and altitude over a window
//! - Cumulative great-circle distance between consecutive samples

#![forbid(unsafe_code)]
#![warn(clippy::all, missing_docs)]

pub mod aggregator;
pub mod error;

pub use aggregator::{DEFAULT_WINDOW_HOURS, TelemetryAggregator};
pub use error::{AnalyticsError, Result};
