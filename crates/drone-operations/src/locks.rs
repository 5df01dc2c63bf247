//! Per-drone serialization.
//!
//! Every check-then-write on a drone's missions or telemetry runs while
//! holding that drone's lock. Different drones never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct DroneLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl DroneLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `drone_id`; released when the guard drops.
    pub async fn acquire(&self, drone_id: Uuid) -> DroneGuard<'_> {
        // Clone the Arc out so no map shard stays locked across the await.
        let lock = self.locks.entry(drone_id).or_default().clone();
        DroneGuard {
            guard: Some(lock.lock_owned().await),
            locks: self,
            drone_id,
        }
    }

    /// Number of drones with a lock currently held or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one drone. Dropping the last guard or waiter for a
/// drone removes its entry.
#[derive(Debug)]
pub struct DroneGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DroneLocks,
    drone_id: Uuid,
}

impl Drop for DroneGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone, so a count of 1 means only the map is left.
        self.locks
            .locks
            .remove_if(&self.drone_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
