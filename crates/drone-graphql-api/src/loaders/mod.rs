//! # DataLoaders
//!
//! Batch data loading for N+1 query prevention in GraphQL resolvers.

use async_graphql::dataloader::Loader;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use drone_domain::Drone;
use drone_operations::{FleetService, OpsError};

// =============================================================================
// DRONE LOADER
// =============================================================================

/// Resolves `Mission.drone` once per distinct drone within a request
pub struct DroneLoader {
    fleet: Arc<FleetService>,
}

impl DroneLoader {
    pub fn new(fleet: Arc<FleetService>) -> Self {
        Self { fleet }
    }
}

impl Loader<Uuid> for DroneLoader {
    type Value = Drone;
    type Error = Arc<ApiError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading drones");

        let results = join_all(keys.iter().map(|&id| self.fleet.get(id))).await;

        let mut drones = HashMap::with_capacity(keys.len());
        for result in results {
            match result {
                Ok(drone) => {
                    drones.insert(drone.id, drone);
                }
                Err(OpsError::NotFound { .. }) => {}
                Err(err) => return Err(Arc::new(err.into())),
            }
        }
        Ok(drones)
    }
}
