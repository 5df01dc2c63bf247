//! # Strategy Module
//!
//! Enum-dispatched cache/store access patterns.
//!
//! ### Read Strategies
//! - `CacheFirst` - Check cache, fall back to the store on miss (default)
//! - `DbOnly` - Skip cache entirely
//! - `CacheOnly` - Never hit the store
//! - `ReadThrough` - Always read the store, populate cache
//!
//! ### Write Strategies
//! - `WriteThrough` - Store, then cache (default)
//! - `WriteAround` - Store, then invalidate cache
//! - `DbOnly` - Store only
//!
//! ```rust,ignore
//! let latest = ReadStrategy::CacheFirst
//!     .read(
//!         || cache.get_latest(drone_id),
//!         || telemetry.get_latest(drone_id),
//!         |sample| async move { cache.set_latest(&sample).await },
//!     )
//!     .await?;
//! ```

pub mod read_strategy;
pub mod write_strategy;

pub use read_strategy::ReadStrategy;
pub use write_strategy::WriteStrategy;

/// Strategy name that matches no variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cache strategy: {0}")]
pub struct UnknownStrategy(pub String);
