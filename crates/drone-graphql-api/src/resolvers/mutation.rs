//! # GraphQL Mutation Resolver
//!
//! Write operations for drones, missions and telemetry.

use async_graphql::{Context, ID, Object, Result};

use crate::context::ApiContext;
use crate::error::IntoGraphQL;
use crate::schema::*;

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    // =========================================================================
    // DRONE MUTATIONS
    // =========================================================================

    #[graphql(name = "registerDrone")]
    async fn register_drone(&self, ctx: &Context<'_>, input: RegisterDroneInput) -> Result<Drone> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let drone = api_ctx.ops.fleet.register(input.into()).await.gql()?;
        Ok(drone.into())
    }

    #[graphql(name = "updateDrone")]
    async fn update_drone(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateDroneInput,
    ) -> Result<Drone> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let drone = api_ctx.ops.fleet.update(uuid, input.into()).await.gql()?;
        Ok(drone.into())
    }

    /// Remove a drone and return it. Its missions and telemetry are kept.
    #[graphql(name = "deleteDrone")]
    async fn delete_drone(&self, ctx: &Context<'_>, id: ID) -> Result<Drone> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let drone = api_ctx.ops.fleet.delete(uuid).await.gql()?;
        Ok(drone.into())
    }

    // =========================================================================
    // MISSION MUTATIONS
    // =========================================================================

    /// Schedule a mission on a drone whose time slot is free
    ///
    /// Fails with CONFLICT when another scheduled or in-progress mission of
    /// the same drone overlaps `[startTime, endTime)`.
    #[graphql(name = "scheduleMission")]
    async fn schedule_mission(
        &self,
        ctx: &Context<'_>,
        input: ScheduleMissionInput,
    ) -> Result<Mission> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let new_mission = input.into_domain().gql()?;
        let mission = api_ctx.ops.scheduler.schedule(new_mission).await.gql()?;
        Ok(mission.into())
    }

    #[graphql(name = "updateMission")]
    async fn update_mission(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateMissionInput,
    ) -> Result<Mission> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let mission = api_ctx.ops.scheduler.update(uuid, input.into()).await.gql()?;
        Ok(mission.into())
    }

    /// SCHEDULED → IN_PROGRESS once the start time has passed
    #[graphql(name = "startMission")]
    async fn start_mission(&self, ctx: &Context<'_>, id: ID) -> Result<Mission> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let mission = api_ctx.ops.scheduler.start(uuid).await.gql()?;
        Ok(mission.into())
    }

    #[graphql(name = "completeMission")]
    async fn complete_mission(&self, ctx: &Context<'_>, id: ID) -> Result<Mission> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let mission = api_ctx.ops.scheduler.complete(uuid).await.gql()?;
        Ok(mission.into())
    }

    /// SCHEDULED → CANCELLED
    #[graphql(name = "cancelMission")]
    async fn cancel_mission(&self, ctx: &Context<'_>, id: ID) -> Result<Mission> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let mission = api_ctx.ops.scheduler.cancel(uuid).await.gql()?;
        Ok(mission.into())
    }

    #[graphql(name = "deleteMission")]
    async fn delete_mission(&self, ctx: &Context<'_>, id: ID) -> Result<Mission> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;
        let mission = api_ctx.ops.scheduler.delete(uuid).await.gql()?;
        Ok(mission.into())
    }

    // =========================================================================
    // TELEMETRY MUTATIONS
    // =========================================================================

    /// Record a reading, update the drone's position and battery, and push
    /// it to `droneTelemetry` subscribers
    #[graphql(name = "ingestTelemetry")]
    async fn ingest_telemetry(
        &self,
        ctx: &Context<'_>,
        input: TelemetryInput,
    ) -> Result<TelemetrySample> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let reading = input.into_domain().gql()?;
        let sample = api_ctx.ops.telemetry.ingest(reading).await.gql()?;
        Ok(sample.into())
    }

    /// Delete telemetry older than `days` (default: the configured retention)
    #[graphql(name = "purgeTelemetry")]
    async fn purge_telemetry(
        &self,
        ctx: &Context<'_>,
        #[graphql(validator(minimum = 1))] days: Option<u32>,
    ) -> Result<PurgeResult> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let retention = &api_ctx.ops.retention;
        let days = days.unwrap_or_else(|| retention.retention_days());
        let deleted = retention.sweep_older_than(days).await.gql()?;
        Ok(PurgeResult {
            deleted,
            older_than_days: days,
        })
    }
}
