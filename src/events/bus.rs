//! In-process Event Bus
//!
//! Fire-and-forget publication over `tokio::sync::broadcast`. Publishers never
//! wait on subscribers, and a publication with nobody listening is not an error.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

use super::{EventEnvelope, EventFilter, WalletEvent};

/// Events buffered per subscriber before the slowest one starts lagging
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Publishing side of the bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event, returning how many subscribers received it
    async fn publish(&self, event: WalletEvent) -> usize;
}

/// Broadcast-backed bus for a single process
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventEnvelope>,
    events_published: AtomicU64,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Only events published after this call are delivered.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New event subscription");
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publications attempted so far, delivered or not
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: WalletEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(EventEnvelope::new(event)) {
            Ok(receivers) => {
                debug!(topic, receivers, "Event published");
                receivers
            }
            Err(_) => {
                debug!(topic, "Event published with no subscribers");
                0
            }
        }
    }
}

/// Receiving handle returned by [`InMemoryEventBus::subscribe`]
pub struct Subscription {
    receiver: broadcast::Receiver<EventEnvelope>,
    filter: EventFilter,
}

impl Subscription {
    /// Wait for the next matching event; `None` once the bus is dropped
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if self.filter.matches(&envelope.event) => return Some(envelope),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                }
            }
        }
    }

    /// Next matching event already published, without waiting
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) if self.filter.matches(&envelope.event) => return Some(envelope),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                }
                Err(_) => return None,
            }
        }
    }

    /// Every matching event already published
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
