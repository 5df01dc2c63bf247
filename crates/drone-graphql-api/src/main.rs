//! # Drone Operations GraphQL API Server
//!
//! Binary entry point for the GraphQL API service.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drone_graphql_api::{ApiContext, Config, build_router, build_schema};
use drone_persistence::{CacheClient, CacheConfig, SharedTelemetryCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(
        version = drone_graphql_api::VERSION,
        "Starting Drone Operations GraphQL API"
    );

    let mut builder = ApiContext::builder().with_config(&config);
    if let Some(url) = &config.redis_url {
        tracing::info!(url = %url, "Connecting to Redis");
        let cache: SharedTelemetryCache = Arc::new(CacheClient::new(CacheConfig::with_url(url)).await?);
        builder = builder.with_cache(cache);
        tracing::info!("Redis connected");
    } else {
        tracing::info!("REDIS_URL not set, using in-memory telemetry cache");
    }
    let api_ctx = builder.build();

    // Background retention sweep
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let sweeper = tokio::spawn(
        api_ctx
            .ops
            .retention
            .clone()
            .run(config.retention_sweep_interval, shutdown_tx.subscribe()),
    );

    let channels = api_ctx.channels().clone();
    let schema = build_schema(api_ctx, &config);

    tracing::info!(
        playground = config.enable_playground,
        max_depth = config.max_query_depth,
        max_complexity = config.max_query_complexity,
        retention_days = config.telemetry_retention_days,
        read_strategy = %config.telemetry_read_strategy,
        "GraphQL schema built"
    );

    let app = build_router(schema, &config);

    let addr = config.server_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "GraphQL endpoint at http://{}/graphql", addr);
    tracing::info!("WebSocket subscriptions at ws://{}/graphql/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Ends every open droneTelemetry stream
    channels.close();
    let _ = shutdown_tx.send(());
    if let Err(err) = sweeper.await {
        tracing::warn!(error = %err, "Retention sweep task failed");
    }

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
