//! # Mission Scheduler
//!
//! Owns mission records: conflict detection on a drone's timeline, the
//! status lifecycle, and the drone status that follows from it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::error::{OpsError, OpsResult};
use crate::locks::DroneLocks;
use drone_domain::{
    Mission, MissionPatch, MissionStatus, MissionType, NewMission, Priority, drone_status_for,
};
use drone_persistence::{DroneRepository, MissionQuery, MissionRepository};

/// Look-ahead used by `upcoming` when none is given.
pub const DEFAULT_UPCOMING_HOURS: u32 = 24;

/// Optional filters for `MissionScheduler::list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissionFilter {
    pub status: Option<MissionStatus>,
    pub mission_type: Option<MissionType>,
    pub priority: Option<Priority>,
}

pub struct MissionScheduler {
    drones: Arc<dyn DroneRepository>,
    missions: Arc<dyn MissionRepository>,
    locks: Arc<DroneLocks>,
    clock: SharedClock,
}

impl MissionScheduler {
    pub fn new(
        drones: Arc<dyn DroneRepository>,
        missions: Arc<dyn MissionRepository>,
        locks: Arc<DroneLocks>,
        clock: SharedClock,
    ) -> Self {
        Self {
            drones,
            missions,
            locks,
            clock,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create a `scheduled` mission if the drone's slot is free.
    #[tracing::instrument(skip(self, input), fields(drone_id = %input.drone_id))]
    pub async fn schedule(&self, input: NewMission) -> OpsResult<Mission> {
        input.validate()?;

        // A delete takes the same lock, so the drone cannot vanish before
        // the mission is stored.
        let _guard = self.locks.acquire(input.drone_id).await;
        if !self.drones.exists(input.drone_id).await? {
            return Err(OpsError::drone_not_found(input.drone_id));
        }
        self.ensure_slot_free(input.drone_id, input.start_time, input.end_time, None)
            .await?;

        let mission = input.into_mission(Uuid::new_v4(), self.clock.now());
        self.missions.create(&mission).await?;
        self.sync_drone_status(&mission).await?;

        tracing::info!(
            mission_id = %mission.id,
            start = %mission.start_time,
            end = %mission.end_time,
            "Mission scheduled"
        );
        Ok(mission)
    }

    /// Apply a partial update. Schedule changes are conflict-checked against
    /// the drone's other missions.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, mission_id: Uuid, patch: MissionPatch) -> OpsResult<Mission> {
        let drone_id = self.get(mission_id).await?.drone_id;
        patch.validate()?;

        let _guard = self.locks.acquire(drone_id).await;
        let mut mission = self.get(mission_id).await?;

        let reactivates = patch
            .status
            .is_some_and(|s| s.occupies_slot() && !mission.status.occupies_slot());
        if patch.touches_schedule() || reactivates {
            patch.validate_against(&mission)?;
            let (start, end) = patch.merged_schedule(&mission);
            self.ensure_slot_free(drone_id, start, end, Some(mission_id))
                .await?;
        }

        let status_changed = patch.status.is_some_and(|s| s != mission.status);
        patch.apply(&mut mission, self.clock.now());
        self.missions.update(&mission).await?;
        if status_changed {
            self.sync_drone_status(&mission).await?;
        }

        tracing::info!(mission_id = %mission.id, status = mission.status.as_str(), "Mission updated");
        Ok(mission)
    }

    /// `scheduled → in-progress`, not before the mission's start time.
    pub async fn start(&self, mission_id: Uuid) -> OpsResult<Mission> {
        self.transition(mission_id, "start", MissionStatus::InProgress, |m, now| {
            if m.status != MissionStatus::Scheduled {
                return Err(OpsError::InvalidState {
                    mission_id: m.id,
                    action: "start",
                    status: m.status,
                });
            }
            if now < m.start_time {
                return Err(OpsError::TooEarly {
                    mission_id: m.id,
                    start_time: m.start_time,
                });
            }
            Ok(())
        })
        .await
    }

    /// Mark completed from any status.
    pub async fn complete(&self, mission_id: Uuid) -> OpsResult<Mission> {
        self.transition(mission_id, "complete", MissionStatus::Completed, |_, _| Ok(()))
            .await
    }

    /// `scheduled → cancelled`
    pub async fn cancel(&self, mission_id: Uuid) -> OpsResult<Mission> {
        self.transition(mission_id, "cancel", MissionStatus::Cancelled, |m, _| {
            if m.status == MissionStatus::Scheduled {
                Ok(())
            } else {
                Err(OpsError::InvalidState {
                    mission_id: m.id,
                    action: "cancel",
                    status: m.status,
                })
            }
        })
        .await
    }

    /// Remove a mission. The drone's status is left as it is.
    pub async fn delete(&self, mission_id: Uuid) -> OpsResult<Mission> {
        let mission = self
            .missions
            .delete(mission_id)
            .await?
            .ok_or_else(|| OpsError::mission_not_found(mission_id))?;
        tracing::info!(mission_id = %mission_id, drone_id = %mission.drone_id, "Mission deleted");
        Ok(mission)
    }

    async fn transition(
        &self,
        mission_id: Uuid,
        action: &'static str,
        next: MissionStatus,
        guard: impl FnOnce(&Mission, DateTime<Utc>) -> OpsResult<()>,
    ) -> OpsResult<Mission> {
        let drone_id = self.get(mission_id).await?.drone_id;
        let _lock = self.locks.acquire(drone_id).await;
        let mut mission = self.get(mission_id).await?;

        let now = self.clock.now();
        guard(&mission, now)?;

        mission.status = next;
        mission.updated_at = now;
        self.missions.update(&mission).await?;
        self.sync_drone_status(&mission).await?;

        tracing::info!(mission_id = %mission_id, drone_id = %drone_id, action, "Mission {}", next.as_str());
        Ok(mission)
    }

    async fn ensure_slot_free(
        &self,
        drone_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> OpsResult<()> {
        let mut query = MissionQuery::overlapping(drone_id, start, end);
        if let Some(id) = exclude {
            query = query.excluding(id);
        }

        match self.missions.find(&query).await?.first() {
            Some(existing) => {
                tracing::info!(drone_id = %drone_id, conflicting_mission_id = %existing.id, "Schedule conflict");
                Err(OpsError::Conflict {
                    drone_id,
                    conflicting_mission_id: existing.id,
                })
            }
            None => Ok(()),
        }
    }

    async fn sync_drone_status(&self, mission: &Mission) -> OpsResult<()> {
        let status = drone_status_for(mission.status);
        if !self
            .drones
            .set_status(mission.drone_id, status, mission.updated_at)
            .await?
        {
            tracing::warn!(
                drone_id = %mission.drone_id,
                mission_id = %mission.id,
                "Drone missing, status not updated"
            );
        }
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub async fn get(&self, mission_id: Uuid) -> OpsResult<Mission> {
        self.missions
            .get_by_id(mission_id)
            .await?
            .ok_or_else(|| OpsError::mission_not_found(mission_id))
    }

    /// All missions matching `filter`, earliest start first
    pub async fn list(&self, filter: MissionFilter) -> OpsResult<Vec<Mission>> {
        let query = MissionQuery::new()
            .with_status(filter.status)
            .with_type(filter.mission_type)
            .with_priority(filter.priority);
        Ok(self.missions.find(&query).await?)
    }

    pub async fn for_drone(&self, drone_id: Uuid) -> OpsResult<Vec<Mission>> {
        Ok(self.missions.find(&MissionQuery::for_drone(drone_id)).await?)
    }

    /// Scheduled missions starting within the next `hours`
    pub async fn upcoming(&self, hours: Option<u32>) -> OpsResult<Vec<Mission>> {
        let now = self.clock.now();
        let until = now + Duration::hours(i64::from(hours.unwrap_or(DEFAULT_UPCOMING_HOURS)));
        let query = MissionQuery::new()
            .with_status(Some(MissionStatus::Scheduled))
            .starting_between(now, until);
        Ok(self.missions.find(&query).await?)
    }

    /// Occupying missions whose interval contains now
    pub async fn active(&self) -> OpsResult<Vec<Mission>> {
        let query = MissionQuery::new()
            .with_statuses(&MissionStatus::OCCUPYING)
            .covering(self.clock.now());
        Ok(self.missions.find(&query).await?)
    }
}
