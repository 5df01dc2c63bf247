//! Per-drone telemetry channels.
//!
//! A subscriber owns one bounded inbox and may join any number of drone
//! channels. Publishing never waits: a full inbox loses that event and a
//! closed inbox is pruned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use drone_domain::TelemetrySample;

/// Default inbox capacity per subscriber
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

/// One sample delivered on a drone's channel
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub drone_id: Uuid,
    pub sample: TelemetrySample,
}

#[derive(Debug)]
struct Inner {
    buffer: usize,
    closed: AtomicBool,
    subscribers: DashMap<Uuid, mpsc::Sender<TelemetryEvent>>,
    channels: DashMap<Uuid, HashMap<Uuid, mpsc::Sender<TelemetryEvent>>>,
}

impl Inner {
    fn unregister(&self, subscriber_id: Uuid) {
        self.subscribers.remove(&subscriber_id);
        self.channels.retain(|_, members| {
            members.remove(&subscriber_id);
            !members.is_empty()
        });
    }
}

/// Registry of drone channels, cheap to clone.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    inner: Arc<Inner>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl ChannelRegistry {
    pub fn new(buffer: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                buffer: buffer.max(1),
                closed: AtomicBool::new(false),
                subscribers: DashMap::new(),
                channels: DashMap::new(),
            }),
        }
    }

    /// Create a subscriber with its own inbox. After `close` the returned
    /// subscriber is already disconnected.
    pub fn register(&self) -> Subscriber {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        self.inner.subscribers.insert(id, tx);
        // `close` raises the flag before clearing, so either its clear or
        // this check drops the sender.
        if self.is_closed() {
            self.inner.subscribers.remove(&id);
        }
        tracing::debug!(subscriber_id = %id, "Subscriber registered");

        Subscriber {
            id,
            rx,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Add the subscriber to a drone's channel. Idempotent. Returns `false`
    /// if the subscriber is unknown or disconnected.
    pub fn join(&self, subscriber_id: Uuid, drone_id: Uuid) -> bool {
        let Some(tx) = self
            .inner
            .subscribers
            .get(&subscriber_id)
            .map(|tx| tx.value().clone())
        else {
            return false;
        };
        self.inner
            .channels
            .entry(drone_id)
            .or_default()
            .insert(subscriber_id, tx);
        if self.is_closed() {
            self.inner.unregister(subscriber_id);
            return false;
        }
        tracing::debug!(subscriber_id = %subscriber_id, drone_id = %drone_id, "Joined channel");
        true
    }

    /// Remove the subscriber from a drone's channel. Idempotent. Returns
    /// whether it was a member.
    pub fn leave(&self, subscriber_id: Uuid, drone_id: Uuid) -> bool {
        let removed = self
            .inner
            .channels
            .get_mut(&drone_id)
            .is_some_and(|mut members| members.remove(&subscriber_id).is_some());
        self.inner
            .channels
            .remove_if(&drone_id, |_, members| members.is_empty());
        removed
    }

    /// Deliver `event` to every member of the drone's channel. Returns the
    /// number of inboxes that accepted it.
    pub fn publish(&self, drone_id: Uuid, event: &TelemetryEvent) -> usize {
        let mut delivered = 0;
        let Some(mut members) = self.inner.channels.get_mut(&drone_id) else {
            return 0;
        };

        members.retain(|subscriber_id, tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(subscriber_id = %subscriber_id, drone_id = %drone_id, "Subscriber inbox full, event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(subscriber_id = %subscriber_id, drone_id = %drone_id, "Pruned closed subscriber");
                false
            }
        });
        drop(members);

        self.inner
            .channels
            .remove_if(&drone_id, |_, members| members.is_empty());
        delivered
    }

    /// Disconnect every subscriber. Inboxes drain what they already hold,
    /// then end.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.channels.clear();
        self.inner.subscribers.clear();
        tracing::info!("Telemetry channels closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self, drone_id: Uuid) -> usize {
        self.inner
            .channels
            .get(&drone_id)
            .map_or(0, |members| members.len())
    }
}

/// Receiving end of one subscriber. Dropping it leaves every channel.
#[derive(Debug)]
pub struct Subscriber {
    id: Uuid,
    rx: mpsc::Receiver<TelemetryEvent>,
    registry: Weak<Inner>,
}

impl Subscriber {
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Next event, or `None` once the registry is closed and the inbox is
    /// drained.
    pub async fn recv(&mut self) -> Option<TelemetryEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<TelemetryEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.unregister(self.id);
        }
    }
}
