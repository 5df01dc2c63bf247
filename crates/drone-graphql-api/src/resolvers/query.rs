//! # GraphQL Query Resolver
//!
//! Read operations for drones, missions and telemetry.

use async_graphql::{Context, ID, Object, Result};
use chrono::{DateTime, Utc};

use crate::context::ApiContext;
use crate::error::IntoGraphQL;
use crate::schema::*;
use drone_operations::OpsError;

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    // =========================================================================
    // DRONE QUERIES
    // =========================================================================

    /// Drone by ID; null if unknown
    async fn drone(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Drone>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;

        match api_ctx.ops.fleet.get(uuid).await {
            Ok(drone) => Ok(Some(drone.into())),
            Err(OpsError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err).gql(),
        }
    }

    /// All drones, optionally only those in one status
    async fn drones(&self, ctx: &Context<'_>, status: Option<DroneStatus>) -> Result<Vec<Drone>> {
        let fleet = &ctx.data::<ApiContext>()?.ops.fleet;
        let drones = match status {
            Some(status) => fleet.by_status(status.into()).await,
            None => fleet.list().await,
        }
        .gql()?;
        Ok(drones.into_iter().map(Drone::from).collect())
    }

    /// Drones at or below a battery percentage (default 20)
    #[graphql(name = "lowBatteryDrones")]
    async fn low_battery_drones(
        &self,
        ctx: &Context<'_>,
        threshold: Option<f64>,
    ) -> Result<Vec<Drone>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let drones = api_ctx.ops.fleet.low_battery(threshold).await.gql()?;
        Ok(drones.into_iter().map(Drone::from).collect())
    }

    /// Idle drones with enough battery for a new mission
    #[graphql(name = "availableDrones")]
    async fn available_drones(&self, ctx: &Context<'_>) -> Result<Vec<Drone>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let drones = api_ctx.ops.fleet.available().await.gql()?;
        Ok(drones.into_iter().map(Drone::from).collect())
    }

    // =========================================================================
    // MISSION QUERIES
    // =========================================================================

    /// Mission by ID; null if unknown
    async fn mission(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Mission>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&id).gql()?;

        match api_ctx.ops.scheduler.get(uuid).await {
            Ok(mission) => Ok(Some(mission.into())),
            Err(OpsError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err).gql(),
        }
    }

    /// Missions matching every given criterion, by start time
    async fn missions(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] filter: MissionFilterInput,
    ) -> Result<Vec<Mission>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let missions = api_ctx.ops.scheduler.list(filter.into()).await.gql()?;
        Ok(missions.into_iter().map(Mission::from).collect())
    }

    /// Every mission of one drone, by start time
    #[graphql(name = "droneMissions")]
    async fn drone_missions(&self, ctx: &Context<'_>, drone_id: ID) -> Result<Vec<Mission>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&drone_id).gql()?;
        let missions = api_ctx.ops.scheduler.for_drone(uuid).await.gql()?;
        Ok(missions.into_iter().map(Mission::from).collect())
    }

    /// Scheduled missions starting within the next `hours` (default 24)
    #[graphql(name = "upcomingMissions")]
    async fn upcoming_missions(
        &self,
        ctx: &Context<'_>,
        #[graphql(validator(minimum = 1, maximum = 8760))] hours: Option<u32>,
    ) -> Result<Vec<Mission>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let missions = api_ctx.ops.scheduler.upcoming(hours).await.gql()?;
        Ok(missions.into_iter().map(Mission::from).collect())
    }

    /// Missions whose window covers the current time
    #[graphql(name = "activeMissions")]
    async fn active_missions(&self, ctx: &Context<'_>) -> Result<Vec<Mission>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let missions = api_ctx.ops.scheduler.active().await.gql()?;
        Ok(missions.into_iter().map(Mission::from).collect())
    }

    // =========================================================================
    // TELEMETRY QUERIES
    // =========================================================================

    /// Newest samples first
    #[graphql(name = "recentTelemetry")]
    async fn recent_telemetry(
        &self,
        ctx: &Context<'_>,
        drone_id: ID,
        #[graphql(default = 100, validator(minimum = 1, maximum = 1000))] limit: u32,
    ) -> Result<Vec<TelemetrySample>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&drone_id).gql()?;
        let limit = usize::try_from(limit).ok();
        let samples = api_ctx.ops.telemetry.recent(uuid, limit).await.gql()?;
        Ok(samples.into_iter().map(TelemetrySample::from).collect())
    }

    /// Most recent sample; null if the drone has reported nothing
    #[graphql(name = "latestTelemetry")]
    async fn latest_telemetry(
        &self,
        ctx: &Context<'_>,
        drone_id: ID,
    ) -> Result<Option<TelemetrySample>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&drone_id).gql()?;
        let sample = api_ctx.ops.telemetry.latest(uuid).await.gql()?;
        Ok(sample.map(TelemetrySample::from))
    }

    /// Samples recorded between `start` and `end` inclusive, oldest first
    #[graphql(name = "telemetryRange")]
    async fn telemetry_range(
        &self,
        ctx: &Context<'_>,
        drone_id: ID,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TelemetrySample>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&drone_id).gql()?;
        let samples = api_ctx.ops.telemetry.range(uuid, start, end).await.gql()?;
        Ok(samples.into_iter().map(TelemetrySample::from).collect())
    }

    /// Averages and distance over the last `hours` (default 24)
    #[graphql(name = "telemetryStats")]
    async fn telemetry_stats(
        &self,
        ctx: &Context<'_>,
        drone_id: ID,
        hours: Option<u32>,
    ) -> Result<TelemetryStats> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let uuid = parse_id(&drone_id).gql()?;
        let stats = api_ctx.ops.telemetry.stats(uuid, hours).await.gql()?;
        Ok(stats.into())
    }
}
