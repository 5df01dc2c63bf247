//! # Drone Persistence Library
//!
//! Storage layer for drones, missions and telemetry.
//!
//! ## Architecture
//!
//! Repository traits with an in-memory implementation, plus a
//! latest-telemetry cache applied through enum-dispatched strategies:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Operations Layer                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Repository Traits                          │
//! │  (DroneRepository, MissionRepository, TelemetryRepository)   │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │  TelemetryCache         │   │  In-memory store             │
//! │  (memory or Redis)      │   │  (source of truth)           │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `redis`: Enable the Redis latest-telemetry cache (default)

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod repository;
pub mod strategy;

pub use cache::{MemoryTelemetryCache, SharedTelemetryCache, TelemetryCache};
#[cfg(feature = "redis")]
pub use cache::{CacheClient, CacheConfig};
pub use error::{PersistenceError, Result};
pub use repository::{
    DroneRepository, MemoryDroneRepository, MemoryMissionRepository, MemoryTelemetryRepository,
    MissionQuery, MissionRepository, TelemetryRepository,
};
pub use strategy::{ReadStrategy, UnknownStrategy, WriteStrategy};
