//! # GraphQL Subscription Resolver
//!
//! Live telemetry over the WebSocket endpoint.

use async_graphql::{Context, ID, Result, Subscription};
use futures_util::Stream;

use crate::context::ApiContext;
use crate::error::IntoGraphQL;
use crate::schema::*;

/// GraphQL Subscription root
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Every telemetry sample ingested for a drone after subscribing, in
    /// ingestion order.
    ///
    /// The stream ends when the server shuts down. A client that falls too
    /// far behind misses samples rather than slowing ingestion.
    #[graphql(name = "droneTelemetry")]
    async fn drone_telemetry(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "Drone to follow")] drone_id: ID,
    ) -> Result<impl Stream<Item = TelemetrySample>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let drone_uuid = parse_id(&drone_id).gql()?;
        api_ctx.ops.fleet.get(drone_uuid).await.gql()?;

        let channels = api_ctx.channels().clone();
        let mut subscriber = channels.register();
        channels.join(subscriber.id(), drone_uuid);
        tracing::debug!(
            drone_id = %drone_uuid,
            subscriber_id = %subscriber.id(),
            "Telemetry subscription opened"
        );

        Ok(async_stream::stream! {
            while let Some(event) = subscriber.recv().await {
                yield TelemetrySample::from(event.sample);
            }
        })
    }
}
