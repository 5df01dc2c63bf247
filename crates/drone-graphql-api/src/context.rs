//! # API Context
//!
//! Application state and dependency injection for GraphQL resolvers.

use drone_operations::{ChannelRegistry, DEFAULT_RETENTION_DAYS, DEFAULT_SUBSCRIBER_BUFFER, Operations};
use drone_persistence::{ReadStrategy, SharedTelemetryCache};

use crate::config::Config;

/// Application context shared across all GraphQL resolvers
#[derive(Clone)]
pub struct ApiContext {
    /// Mission, telemetry, fleet and retention services
    pub ops: Operations,
}

impl ApiContext {
    pub fn new(ops: Operations) -> Self {
        Self { ops }
    }

    pub fn builder() -> ApiContextBuilder {
        ApiContextBuilder::new()
    }

    /// Subscriber registry behind `droneTelemetry`
    pub fn channels(&self) -> &ChannelRegistry {
        &self.ops.channels
    }
}

/// Builder for ApiContext
pub struct ApiContextBuilder {
    cache: Option<SharedTelemetryCache>,
    read_strategy: ReadStrategy,
    subscriber_buffer: usize,
    retention_days: u32,
}

impl ApiContextBuilder {
    pub fn new() -> Self {
        Self {
            cache: None,
            read_strategy: ReadStrategy::default(),
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    /// Take the tunables that live in [`Config`]
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.read_strategy = config.telemetry_read_strategy;
        self.subscriber_buffer = config.subscriber_buffer;
        self.retention_days = config.telemetry_retention_days;
        self
    }

    /// Latest-telemetry cache; in-memory when not set
    #[must_use]
    pub fn with_cache(mut self, cache: SharedTelemetryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> ApiContext {
        let mut ops = Operations::builder()
            .read_strategy(self.read_strategy)
            .subscriber_buffer(self.subscriber_buffer)
            .retention_days(self.retention_days);
        if let Some(cache) = self.cache {
            ops = ops.cache(cache);
        }
        ApiContext::new(ops.build())
    }
}

impl Default for ApiContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
