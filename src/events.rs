//! Event bus abstraction
//!
//! Publishing is fire-and-forget: the publisher never waits for subscribers
//! and never sees their reaction. What a subscriber does with a failure
//! notification (blocklist the release, search again, alert someone) is
//! outside this crate.

use tokio::sync::broadcast;

use crate::error::Result;
use crate::types::Event;

/// Trait for publishing events
///
/// Implementations must not block. An `Err` means the bus itself is
/// unusable; it is propagated to the caller without retry.
pub trait EventBus: Send + Sync {
    /// Publish an event to all current subscribers
    fn publish(&self, event: Event) -> Result<()>;
}

/// Event bus backed by a tokio broadcast channel
///
/// Multiple subscribers are supported. Each subscriber receives all events
/// independently. A subscriber that falls more than `capacity` events behind
/// receives `RecvError::Lagged`.
#[derive(Clone, Debug)]
pub struct BroadcastEventBus {
    tx: broadcast::Sender<Event>,
}

impl BroadcastEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to published events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: Event) -> Result<()> {
        // send() only fails when nobody is subscribed, which is fine: the event is dropped
        self.tx.send(event).ok();
        Ok(())
    }
}
