//! Drone registration and fleet queries.

use std::sync::Arc;

use uuid::Uuid;

use crate::clock::SharedClock;
use crate::error::{OpsError, OpsResult};
use crate::locks::DroneLocks;
use drone_domain::{Drone, DronePatch, DroneStatus, NewDrone};
use drone_persistence::DroneRepository;

/// Battery level at or below which a drone is reported as low.
pub const LOW_BATTERY_THRESHOLD: f64 = 20.0;

pub struct FleetService {
    drones: Arc<dyn DroneRepository>,
    locks: Arc<DroneLocks>,
    clock: SharedClock,
}

impl FleetService {
    pub fn new(drones: Arc<dyn DroneRepository>, locks: Arc<DroneLocks>, clock: SharedClock) -> Self {
        Self { drones, locks, clock }
    }

    pub async fn register(&self, input: NewDrone) -> OpsResult<Drone> {
        input.validate()?;
        let drone = input.into_drone(Uuid::new_v4(), self.clock.now());
        self.drones.create(&drone).await?;
        tracing::info!(drone_id = %drone.id, name = %drone.name, "Drone registered");
        Ok(drone)
    }

    pub async fn get(&self, drone_id: Uuid) -> OpsResult<Drone> {
        self.drones
            .get_by_id(drone_id)
            .await?
            .ok_or_else(|| OpsError::drone_not_found(drone_id))
    }

    pub async fn list(&self) -> OpsResult<Vec<Drone>> {
        Ok(self.drones.list().await?)
    }

    pub async fn by_status(&self, status: DroneStatus) -> OpsResult<Vec<Drone>> {
        Ok(self.drones.get_by_status(status).await?)
    }

    pub async fn update(&self, drone_id: Uuid, patch: DronePatch) -> OpsResult<Drone> {
        let _guard = self.locks.acquire(drone_id).await;
        let mut drone = self.get(drone_id).await?;
        patch.validate()?;
        patch.apply(&mut drone, self.clock.now());
        self.drones.update(&drone).await?;
        tracing::info!(drone_id = %drone_id, "Drone updated");
        Ok(drone)
    }

    /// Remove a drone. Its missions and telemetry are kept.
    pub async fn delete(&self, drone_id: Uuid) -> OpsResult<Drone> {
        let _guard = self.locks.acquire(drone_id).await;
        let drone = self
            .drones
            .delete(drone_id)
            .await?
            .ok_or_else(|| OpsError::drone_not_found(drone_id))?;
        tracing::info!(drone_id = %drone_id, "Drone deleted");
        Ok(drone)
    }

    /// Drones with `battery_level <= threshold`
    pub async fn low_battery(&self, threshold: Option<f64>) -> OpsResult<Vec<Drone>> {
        let threshold = threshold.unwrap_or(LOW_BATTERY_THRESHOLD);
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|d| d.battery_level <= threshold)
            .collect())
    }

    /// Idle drones with more than the low-battery threshold left
    pub async fn available(&self) -> OpsResult<Vec<Drone>> {
        Ok(self
            .by_status(DroneStatus::Idle)
            .await?
            .into_iter()
            .filter(|d| d.battery_level > LOW_BATTERY_THRESHOLD)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use drone_persistence::MemoryDroneRepository;
    use fake::Fake;
    use fake::faker::name::en::Name;

    fn fleet() -> FleetService {
        FleetService::new(
            Arc::new(MemoryDroneRepository::new()),
            Arc::new(DroneLocks::new()),
            Arc::new(SystemClock),
        )
    }

    fn named(battery: f64, status: DroneStatus) -> NewDrone {
        let mut input = NewDrone::new(Name().fake::<String>(), "Skydio X10");
        input.battery_level = Some(battery);
        input.status = Some(status);
        input
    }

    #[tokio::test]
    async fn test_register_applies_defaults() {
        let fleet = fleet();
        let drone = fleet.register(NewDrone::new("Osprey", "M30T")).await.unwrap();

        assert_eq!(drone.status, DroneStatus::Idle);
        assert_eq!(drone.battery_level, 100.0);
        assert_eq!(drone.max_flight_time, 30.0);
        assert_eq!(fleet.get(drone.id).await.unwrap(), drone);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_name() {
        let fleet = fleet();
        let err = fleet.register(NewDrone::new("  ", "M30T")).await.unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_battery_queries() {
        let fleet = fleet();
        let low = fleet.register(named(15.0, DroneStatus::Idle)).await.unwrap();
        let edge = fleet.register(named(20.0, DroneStatus::Idle)).await.unwrap();
        let ready = fleet.register(named(80.0, DroneStatus::Idle)).await.unwrap();
        fleet.register(named(90.0, DroneStatus::Maintenance)).await.unwrap();

        let mut low_ids: Vec<Uuid> = fleet.low_battery(None).await.unwrap().iter().map(|d| d.id).collect();
        low_ids.sort();
        let mut expected = vec![low.id, edge.id];
        expected.sort();
        assert_eq!(low_ids, expected);

        let available: Vec<Uuid> = fleet.available().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(available, vec![ready.id]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let fleet = fleet();
        let drone = fleet.register(NewDrone::new("Osprey", "M30T")).await.unwrap();

        let patched = fleet
            .update(drone.id, DronePatch { status: Some(DroneStatus::Maintenance), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(patched.status, DroneStatus::Maintenance);

        fleet.delete(drone.id).await.unwrap();
        assert!(matches!(fleet.get(drone.id).await.unwrap_err(), OpsError::NotFound { .. }));
        assert!(matches!(fleet.delete(drone.id).await.unwrap_err(), OpsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_no_lock_entries() {
        let locks = Arc::new(DroneLocks::new());
        let fleet = FleetService::new(Arc::new(MemoryDroneRepository::new()), locks.clone(), Arc::new(SystemClock));

        for _ in 0..1000 {
            let err = fleet.delete(Uuid::new_v4()).await.unwrap_err();
            assert!(matches!(err, OpsError::NotFound { .. }));
        }
        let err = fleet.update(Uuid::new_v4(), DronePatch::default()).await.unwrap_err();
        assert!(matches!(err, OpsError::NotFound { .. }));

        let drone = fleet.register(NewDrone::new("Osprey", "M30T")).await.unwrap();
        fleet.delete(drone.id).await.unwrap();

        assert!(locks.is_empty());
    }
}
