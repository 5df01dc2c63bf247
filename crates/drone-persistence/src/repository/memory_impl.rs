//! In-memory repository implementation.
//!
//! Drones and telemetry are sharded per drone with `DashMap` so that writes
//! for different drones never wait on each other. Missions live behind one
//! `RwLock` because every conflict query scans them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PersistenceError, Result};
use crate::repository::query::MissionQuery;
use crate::repository::traits::{DroneRepository, MissionRepository, TelemetryRepository};
use drone_domain::{Drone, DroneStatus, GeoPoint, Mission, TelemetrySample, TimeRange};

// =============================================================================
// DRONE REPOSITORY
// =============================================================================

/// Drone registry kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryDroneRepository {
    drones: DashMap<Uuid, Drone>,
}

impl MemoryDroneRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DroneRepository for MemoryDroneRepository {
    async fn get_by_id(&self, drone_id: Uuid) -> Result<Option<Drone>> {
        Ok(self.drones.get(&drone_id).map(|d| d.value().clone()))
    }

    async fn exists(&self, drone_id: Uuid) -> Result<bool> {
        Ok(self.drones.contains_key(&drone_id))
    }

    async fn list(&self) -> Result<Vec<Drone>> {
        let mut drones: Vec<Drone> = self.drones.iter().map(|d| d.value().clone()).collect();
        drones.sort_by_key(|d| d.created_at);
        Ok(drones)
    }

    async fn get_by_status(&self, status: DroneStatus) -> Result<Vec<Drone>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|d| d.status == status)
            .collect())
    }

    async fn create(&self, drone: &Drone) -> Result<()> {
        match self.drones.entry(drone.id) {
            Entry::Occupied(_) => Err(PersistenceError::Duplicate {
                entity_type: "Drone".to_string(),
                key: drone.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(drone.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, drone: &Drone) -> Result<()> {
        let mut stored = self
            .drones
            .get_mut(&drone.id)
            .ok_or_else(|| PersistenceError::not_found("Drone", drone.id))?;
        *stored = drone.clone();
        Ok(())
    }

    async fn set_status(
        &self,
        drone_id: Uuid,
        status: DroneStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(match self.drones.get_mut(&drone_id) {
            Some(mut drone) => {
                drone.status = status;
                drone.updated_at = updated_at;
                true
            }
            None => false,
        })
    }

    async fn set_location_and_battery(
        &self,
        drone_id: Uuid,
        location: GeoPoint,
        battery_level: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(match self.drones.get_mut(&drone_id) {
            Some(mut drone) => {
                drone.current_location = Some(location);
                drone.battery_level = battery_level;
                drone.updated_at = updated_at;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, drone_id: Uuid) -> Result<Option<Drone>> {
        Ok(self.drones.remove(&drone_id).map(|(_, d)| d))
    }
}

// =============================================================================
// MISSION REPOSITORY
// =============================================================================

/// Mission store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryMissionRepository {
    missions: RwLock<HashMap<Uuid, Mission>>,
}

impl MemoryMissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MissionRepository for MemoryMissionRepository {
    async fn get_by_id(&self, mission_id: Uuid) -> Result<Option<Mission>> {
        Ok(self.missions.read().await.get(&mission_id).cloned())
    }

    async fn find(&self, query: &MissionQuery) -> Result<Vec<Mission>> {
        let mut found: Vec<Mission> = self
            .missions
            .read()
            .await
            .values()
            .filter(|m| query.matches(m))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(found)
    }

    async fn create(&self, mission: &Mission) -> Result<()> {
        let mut missions = self.missions.write().await;
        if missions.contains_key(&mission.id) {
            return Err(PersistenceError::Duplicate {
                entity_type: "Mission".to_string(),
                key: mission.id.to_string(),
            });
        }
        missions.insert(mission.id, mission.clone());
        Ok(())
    }

    async fn update(&self, mission: &Mission) -> Result<()> {
        let mut missions = self.missions.write().await;
        let stored = missions
            .get_mut(&mission.id)
            .ok_or_else(|| PersistenceError::not_found("Mission", mission.id))?;
        *stored = mission.clone();
        Ok(())
    }

    async fn delete(&self, mission_id: Uuid) -> Result<Option<Mission>> {
        Ok(self.missions.write().await.remove(&mission_id))
    }
}

// =============================================================================
// TELEMETRY REPOSITORY
// =============================================================================

/// Append-only telemetry log, one timestamp-ordered vector per drone.
#[derive(Debug, Default)]
pub struct MemoryTelemetryRepository {
    samples: DashMap<Uuid, Vec<TelemetrySample>>,
}

impl MemoryTelemetryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_where(
        &self,
        drone_id: Uuid,
        keep: impl Fn(&TelemetrySample) -> bool,
    ) -> Vec<TelemetrySample> {
        self.samples
            .get(&drone_id)
            .map(|log| log.iter().filter(|s| keep(s)).cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TelemetryRepository for MemoryTelemetryRepository {
    async fn insert(&self, sample: &TelemetrySample) -> Result<()> {
        let mut log = self.samples.entry(sample.drone_id).or_default();
        // equal timestamps keep arrival order
        let at = log.partition_point(|s| s.timestamp <= sample.timestamp);
        log.insert(at, sample.clone());
        Ok(())
    }

    async fn get_by_drone_range(
        &self,
        drone_id: Uuid,
        range: TimeRange,
    ) -> Result<Vec<TelemetrySample>> {
        Ok(self.collect_where(drone_id, |s| range.contains(s.timestamp)))
    }

    async fn get_by_drone_since(
        &self,
        drone_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<TelemetrySample>> {
        Ok(self.collect_where(drone_id, |s| s.timestamp >= since))
    }

    async fn get_recent(&self, drone_id: Uuid, limit: usize) -> Result<Vec<TelemetrySample>> {
        Ok(self
            .samples
            .get(&drone_id)
            .map(|log| log.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut deleted = 0u64;
        for mut log in self.samples.iter_mut() {
            let before = log.len();
            log.retain(|s| s.timestamp >= cutoff);
            deleted += (before - log.len()) as u64;
        }
        self.samples.retain(|_, log| !log.is_empty());
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use drone_domain::{MissionStatus, NewDrone, NewTelemetry};
    use tokio_test::{assert_err, assert_ok};

    fn sample_at(drone_id: Uuid, ts: DateTime<Utc>, lat: f64) -> TelemetrySample {
        let mut input = NewTelemetry::new(drone_id, lat, 0.0, 80.0);
        input.timestamp = Some(ts);
        input.into_sample(Uuid::new_v4(), ts)
    }

    #[tokio::test]
    async fn test_drone_status_and_location_updates() {
        let repo = MemoryDroneRepository::new();
        let t0 = Utc::now();
        let drone = NewDrone::new("Hawk", "X1").into_drone(Uuid::new_v4(), t0);
        assert_ok!(repo.create(&drone).await);

        let later = t0 + Duration::minutes(5);
        assert!(repo.set_status(drone.id, DroneStatus::InMission, t0).await.unwrap());
        assert!(repo
            .set_location_and_battery(drone.id, GeoPoint::new(1.0, 2.0), 42.0, later)
            .await
            .unwrap());

        let stored = repo.get_by_id(drone.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DroneStatus::InMission);
        assert_eq!(stored.battery_level, 42.0);
        assert_eq!(stored.current_location, Some(GeoPoint::new(1.0, 2.0)));
        assert_eq!(stored.updated_at, later);

        assert!(!repo.set_status(Uuid::new_v4(), DroneStatus::Idle, t0).await.unwrap());
        assert_err!(repo.create(&drone).await);
    }

    #[tokio::test]
    async fn test_telemetry_ordered_by_timestamp() {
        let repo = MemoryTelemetryRepository::new();
        let drone = Uuid::new_v4();
        let t0 = Utc::now();

        repo.insert(&sample_at(drone, t0 + Duration::seconds(2), 2.0)).await.unwrap();
        repo.insert(&sample_at(drone, t0, 0.0)).await.unwrap();
        repo.insert(&sample_at(drone, t0 + Duration::seconds(1), 1.0)).await.unwrap();

        let all = repo.get_by_drone_since(drone, t0).await.unwrap();
        let lats: Vec<f64> = all.iter().map(|s| s.latitude).collect();
        assert_eq!(lats, vec![0.0, 1.0, 2.0]);

        let latest = repo.get_latest(drone).await.unwrap().unwrap();
        assert_eq!(latest.latitude, 2.0);

        let range = TimeRange::new(t0 + Duration::seconds(1), t0 + Duration::seconds(2));
        assert_eq!(repo.get_by_drone_range(drone, range).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_older_than() {
        let repo = MemoryTelemetryRepository::new();
        let drone = Uuid::new_v4();
        let now = Utc::now();

        repo.insert(&sample_at(drone, now - Duration::days(40), 0.0)).await.unwrap();
        repo.insert(&sample_at(drone, now - Duration::days(31), 0.0)).await.unwrap();
        repo.insert(&sample_at(drone, now - Duration::days(1), 0.0)).await.unwrap();

        let deleted = repo.delete_older_than(now - Duration::days(30)).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.get_recent(drone, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mission_find_sorted_by_start() {
        let repo = MemoryMissionRepository::new();
        let drone = Uuid::new_v4();
        let t0 = Utc::now();

        for offset in [3, 1, 2] {
            let start = t0 + Duration::hours(offset);
            let m = drone_domain::NewMission {
                drone_id: drone,
                name: format!("m{offset}"),
                description: None,
                start_time: start,
                end_time: start + Duration::minutes(30),
                mission_type: Default::default(),
                priority: Default::default(),
                coordinates: drone_domain::MissionCoordinates {
                    start: GeoPoint::new(0.0, 0.0),
                    end: GeoPoint::new(0.0, 0.0),
                },
            }
            .into_mission(Uuid::new_v4(), t0);
            repo.create(&m).await.unwrap();
        }

        let found = repo.find(&MissionQuery::for_drone(drone)).await.unwrap();
        let names: Vec<&str> = found.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["m1", "m2", "m3"]);

        let none = repo
            .find(&MissionQuery::new().with_status(Some(MissionStatus::Completed)))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
