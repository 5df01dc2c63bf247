//! # Repository Module
//!
//! Repository pattern for drones, missions and telemetry.

pub mod memory_impl;
pub mod query;
pub mod traits;

pub use memory_impl::{MemoryDroneRepository, MemoryMissionRepository, MemoryTelemetryRepository};
pub use query::MissionQuery;
pub use traits::{DroneRepository, MissionRepository, TelemetryRepository};
