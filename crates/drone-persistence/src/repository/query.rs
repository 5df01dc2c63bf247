//! Mission filter used by `MissionRepository::find`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use drone_domain::{Mission, MissionStatus, MissionType, Priority};

/// Conjunction of optional predicates over missions.
///
/// An empty `statuses` list matches every status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionQuery {
    pub drone_id: Option<Uuid>,
    pub statuses: Vec<MissionStatus>,
    pub mission_type: Option<MissionType>,
    pub priority: Option<Priority>,
    /// `start_time < t`
    pub starts_before: Option<DateTime<Utc>>,
    /// `start_time <= t`
    pub starts_no_later_than: Option<DateTime<Utc>>,
    /// `start_time >= t`
    pub starts_no_earlier_than: Option<DateTime<Utc>>,
    /// `end_time > t`
    pub ends_after: Option<DateTime<Utc>>,
    /// `end_time >= t`
    pub ends_no_earlier_than: Option<DateTime<Utc>>,
    pub exclude_id: Option<Uuid>,
}

impl MissionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_drone(drone_id: Uuid) -> Self {
        Self {
            drone_id: Some(drone_id),
            ..Self::default()
        }
    }

    /// Occupying missions of `drone_id` whose interval overlaps `[start, end)`
    pub fn overlapping(drone_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::for_drone(drone_id)
            .with_statuses(&MissionStatus::OCCUPYING)
            .starting_before(end)
            .ending_after(start)
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: &[MissionStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    #[must_use]
    pub fn with_status(self, status: Option<MissionStatus>) -> Self {
        match status {
            Some(s) => self.with_statuses(&[s]),
            None => self,
        }
    }

    #[must_use]
    pub fn with_type(mut self, mission_type: Option<MissionType>) -> Self {
        self.mission_type = mission_type;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn starting_before(mut self, t: DateTime<Utc>) -> Self {
        self.starts_before = Some(t);
        self
    }

    #[must_use]
    pub fn starting_between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.starts_no_earlier_than = Some(from);
        self.starts_no_later_than = Some(until);
        self
    }

    #[must_use]
    pub fn ending_after(mut self, t: DateTime<Utc>) -> Self {
        self.ends_after = Some(t);
        self
    }

    /// Missions whose closed interval contains `t`
    #[must_use]
    pub fn covering(mut self, t: DateTime<Utc>) -> Self {
        self.starts_no_later_than = Some(t);
        self.ends_no_earlier_than = Some(t);
        self
    }

    #[must_use]
    pub fn excluding(mut self, mission_id: Uuid) -> Self {
        self.exclude_id = Some(mission_id);
        self
    }

    /// Evaluate the query against one mission
    #[must_use]
    pub fn matches(&self, m: &Mission) -> bool {
        self.drone_id.is_none_or(|id| m.drone_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&m.status))
            && self.mission_type.is_none_or(|t| m.mission_type == t)
            && self.priority.is_none_or(|p| m.priority == p)
            && self.starts_before.is_none_or(|t| m.start_time < t)
            && self.starts_no_later_than.is_none_or(|t| m.start_time <= t)
            && self.starts_no_earlier_than.is_none_or(|t| m.start_time >= t)
            && self.ends_after.is_none_or(|t| m.end_time > t)
            && self.ends_no_earlier_than.is_none_or(|t| m.end_time >= t)
            && self.exclude_id.is_none_or(|id| m.id != id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use drone_domain::{GeoPoint, MissionCoordinates, NewMission};

    fn mission(drone_id: Uuid, start: DateTime<Utc>, hours: i64) -> Mission {
        NewMission {
            drone_id,
            name: "survey".to_string(),
            description: None,
            start_time: start,
            end_time: start + Duration::hours(hours),
            mission_type: MissionType::Surveillance,
            priority: Priority::Medium,
            coordinates: MissionCoordinates {
                start: GeoPoint::new(0.0, 0.0),
                end: GeoPoint::new(0.1, 0.1),
            },
        }
        .into_mission(Uuid::new_v4(), start)
    }

    #[test]
    fn test_overlapping_query() {
        let drone = Uuid::new_v4();
        let t0 = Utc::now();
        let m = mission(drone, t0, 1);

        assert!(MissionQuery::overlapping(drone, t0 + Duration::minutes(30), t0 + Duration::hours(2)).matches(&m));
        assert!(!MissionQuery::overlapping(drone, t0 + Duration::hours(1), t0 + Duration::hours(2)).matches(&m));
        assert!(!MissionQuery::overlapping(Uuid::new_v4(), t0, t0 + Duration::hours(1)).matches(&m));
        assert!(!MissionQuery::overlapping(drone, t0, t0 + Duration::hours(1)).excluding(m.id).matches(&m));
    }

    #[test]
    fn test_overlapping_ignores_finished_missions() {
        let drone = Uuid::new_v4();
        let t0 = Utc::now();
        let mut m = mission(drone, t0, 1);
        m.status = MissionStatus::Cancelled;

        assert!(!MissionQuery::overlapping(drone, t0, t0 + Duration::hours(1)).matches(&m));
    }

    #[test]
    fn test_covering_is_inclusive() {
        let t0 = Utc::now();
        let m = mission(Uuid::new_v4(), t0, 1);

        assert!(MissionQuery::new().covering(t0).matches(&m));
        assert!(MissionQuery::new().covering(t0 + Duration::hours(1)).matches(&m));
        assert!(!MissionQuery::new().covering(t0 + Duration::hours(2)).matches(&m));
    }
}
