use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use drone_domain::{
    Drone, DroneStatus, GeoPoint, MissionCoordinates, MissionStatus, MissionType, NewDrone,
    NewMission, NewTelemetry, Priority,
};
use drone_operations::{Clock, ManualClock, OpsError, Operations};
use drone_persistence::{DroneRepository, MemoryDroneRepository, Result as PersistenceResult};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

/// Drone store whose deletes pause before removing the record.
struct SlowDeleteDrones {
    inner: MemoryDroneRepository,
    delay: StdDuration,
}

#[async_trait]
impl DroneRepository for SlowDeleteDrones {
    async fn get_by_id(&self, drone_id: Uuid) -> PersistenceResult<Option<Drone>> {
        self.inner.get_by_id(drone_id).await
    }

    async fn list(&self) -> PersistenceResult<Vec<Drone>> {
        self.inner.list().await
    }

    async fn get_by_status(&self, status: DroneStatus) -> PersistenceResult<Vec<Drone>> {
        self.inner.get_by_status(status).await
    }

    async fn create(&self, drone: &Drone) -> PersistenceResult<()> {
        self.inner.create(drone).await
    }

    async fn update(&self, drone: &Drone) -> PersistenceResult<()> {
        self.inner.update(drone).await
    }

    async fn set_status(
        &self,
        drone_id: Uuid,
        status: DroneStatus,
        updated_at: DateTime<Utc>,
    ) -> PersistenceResult<bool> {
        self.inner.set_status(drone_id, status, updated_at).await
    }

    async fn set_location_and_battery(
        &self,
        drone_id: Uuid,
        location: GeoPoint,
        battery_level: f64,
        updated_at: DateTime<Utc>,
    ) -> PersistenceResult<bool> {
        self.inner
            .set_location_and_battery(drone_id, location, battery_level, updated_at)
            .await
    }

    async fn delete(&self, drone_id: Uuid) -> PersistenceResult<Option<Drone>> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(drone_id).await
    }
}

fn mission(drone_id: Uuid, name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> NewMission {
    NewMission {
        drone_id,
        name: name.to_string(),
        description: Some("north field".to_string()),
        start_time: start,
        end_time: end,
        mission_type: MissionType::Mapping,
        priority: Priority::Medium,
        coordinates: MissionCoordinates {
            start: GeoPoint::new(51.5, -0.12),
            end: GeoPoint::new(51.6, -0.10),
        },
    }
}

#[tokio::test]
async fn scheduling_and_lifecycle_drive_drone_status() {
    let t = Utc::now();
    let clock = Arc::new(ManualClock::new(t));
    let ops = Operations::builder().clock(clock.clone()).build();

    let drone = ops
        .fleet
        .register(NewDrone::new("Drone A", "Matrice 30"))
        .await
        .unwrap();

    let m1 = ops
        .scheduler
        .schedule(mission(drone.id, "M1", t + Duration::hours(1), t + Duration::hours(2)))
        .await
        .unwrap();
    assert_eq!(m1.status, MissionStatus::Scheduled);
    assert_eq!(m1.duration_minutes(), 60);

    let m2 = ops
        .scheduler
        .schedule(mission(
            drone.id,
            "M2",
            t + Duration::minutes(90),
            t + Duration::minutes(150),
        ))
        .await
        .unwrap_err();
    assert!(matches!(m2, OpsError::Conflict { conflicting_mission_id, .. } if conflicting_mission_id == m1.id));

    let early = ops.scheduler.start(m1.id).await.unwrap_err();
    assert!(matches!(early, OpsError::TooEarly { .. }));

    clock.advance(Duration::minutes(61));
    let started = ops.scheduler.start(m1.id).await.unwrap();
    assert_eq!(started.status, MissionStatus::InProgress);
    assert_eq!(ops.fleet.get(drone.id).await.unwrap().status, DroneStatus::InMission);
    assert_eq!(ops.scheduler.active().await.unwrap().len(), 1);

    let completed = ops.scheduler.complete(m1.id).await.unwrap();
    assert_eq!(completed.status, MissionStatus::Completed);
    assert_eq!(ops.fleet.get(drone.id).await.unwrap().status, DroneStatus::Idle);
    assert!(ops.scheduler.active().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_schedules_for_one_slot_admit_exactly_one() {
    let ops = Operations::builder().build();
    let drone = ops
        .fleet
        .register(NewDrone::new("Racer", "FPV"))
        .await
        .unwrap();
    let start = Utc::now() + Duration::hours(1);

    let attempts: Vec<_> = (0..16)
        .map(|i| {
            let scheduler = ops.scheduler.clone();
            let input = mission(drone.id, &format!("attempt-{i}"), start, start + Duration::hours(1));
            tokio::spawn(async move { scheduler.schedule(input).await })
        })
        .collect();

    let mut scheduled = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => scheduled += 1,
            Err(OpsError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(scheduled, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(ops.scheduler.for_drone(drone.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn telemetry_reaches_subscribers_until_they_leave() {
    let ops = Operations::builder().subscriber_buffer(8).build();
    let drone = ops
        .fleet
        .register(NewDrone::new("Scout", "Mavic 3"))
        .await
        .unwrap();

    let mut subscriber = ops.channels.register();
    ops.channels.join(subscriber.id(), drone.id);

    for battery in [95.0, 94.0, 93.0] {
        ops.telemetry
            .ingest(NewTelemetry::new(drone.id, 48.85, 2.35, battery))
            .await
            .unwrap();
    }
    for battery in [95.0, 94.0, 93.0] {
        let event = subscriber.recv().await.unwrap();
        assert_eq!(event.drone_id, drone.id);
        assert_eq!(event.sample.battery, battery);
    }

    ops.channels.leave(subscriber.id(), drone.id);
    ops.telemetry
        .ingest(NewTelemetry::new(drone.id, 48.85, 2.35, 92.0))
        .await
        .unwrap();
    assert!(subscriber.try_recv().is_none());

    assert_eq!(ops.fleet.get(drone.id).await.unwrap().battery_level, 92.0);
    assert_eq!(ops.telemetry.stats(drone.id, None).await.unwrap().data_points, 4);

    ops.channels.close();
    assert!(subscriber.recv().await.is_none());
}

#[tokio::test]
async fn writes_queued_behind_a_delete_see_the_drone_gone() {
    let drones = Arc::new(SlowDeleteDrones {
        inner: MemoryDroneRepository::new(),
        delay: StdDuration::from_millis(50),
    });
    let ops = Operations::builder().drones(drones).build();
    let drone = assert_ok!(ops.fleet.register(NewDrone::new("Wren", "Anafi")).await);

    let deleting = {
        let fleet = ops.fleet.clone();
        tokio::spawn(async move { fleet.delete(drone.id).await })
    };
    tokio::time::sleep(StdDuration::from_millis(10)).await;

    let start = Utc::now() + Duration::hours(1);
    let err = assert_err!(
        ops.scheduler
            .schedule(mission(drone.id, "late", start, start + Duration::hours(1)))
            .await
    );
    assert!(matches!(err, OpsError::NotFound { entity_type: "Drone", .. }));

    let err = assert_err!(ops.telemetry.ingest(NewTelemetry::new(drone.id, 1.0, 1.0, 80.0)).await);
    assert!(matches!(err, OpsError::NotFound { entity_type: "Drone", .. }));

    assert_ok!(deleting.await.unwrap());
    assert!(ops.scheduler.for_drone(drone.id).await.unwrap().is_empty());
    assert!(ops.telemetry.recent(drone.id, None).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingest_keeps_per_drone_order_past_a_full_inbox() {
    const BUFFER: usize = 32;
    const PER_DRONE: usize = 30;

    let clock = Arc::new(ManualClock::default());
    let ops = Operations::builder()
        .clock(clock.clone())
        .subscriber_buffer(BUFFER)
        .build();
    let a = assert_ok!(ops.fleet.register(NewDrone::new("Alpha", "M30T")).await);
    let b = assert_ok!(ops.fleet.register(NewDrone::new("Bravo", "M30T")).await);

    // Never read: its inbox fills and stays full.
    let stalled = ops.channels.register();
    ops.channels.join(stalled.id(), a.id);
    for _ in 0..BUFFER {
        assert_ok!(ops.telemetry.ingest(NewTelemetry::new(a.id, 0.0, 0.0, 99.0)).await);
    }

    let mut watch_a = ops.channels.register();
    let mut watch_b = ops.channels.register();
    ops.channels.join(watch_a.id(), a.id);
    ops.channels.join(watch_b.id(), b.id);

    let tasks: Vec<_> = (0..PER_DRONE)
        .flat_map(|i| [(a.id, i), (b.id, i)])
        .map(|(drone_id, i)| {
            let telemetry = ops.telemetry.clone();
            #[allow(clippy::cast_precision_loss)]
            let battery = i as f64;
            tokio::spawn(async move { telemetry.ingest(NewTelemetry::new(drone_id, 10.0, 10.0, battery)).await })
        })
        .collect();

    let all_done = tokio::time::timeout(StdDuration::from_secs(5), async {
        for task in tasks {
            assert_ok!(task.await.unwrap());
        }
    })
    .await;
    assert!(all_done.is_ok(), "ingestion waited on a full inbox");

    let now = clock.now();
    for (drone_id, watcher, skip) in [(a.id, &mut watch_a, BUFFER), (b.id, &mut watch_b, 0)] {
        let stored: Vec<Uuid> = ops
            .telemetry
            .range(drone_id, now, now)
            .await
            .unwrap()
            .into_iter()
            .skip(skip)
            .map(|s| s.id)
            .collect();

        let mut delivered = Vec::new();
        while let Some(event) = watcher.try_recv() {
            assert_eq!(event.drone_id, drone_id);
            delivered.push(event.sample.id);
        }
        assert_eq!(stored.len(), PER_DRONE);
        assert_eq!(delivered, stored);
    }

    assert_eq!(ops.channels.subscriber_count(a.id), 2);
}
