//! Broadcast channel carrying [`Event`]s from the runtime to observers.
//!
//! Everything the supervisor and its respawn loop report goes through one
//! [`Bus`]: a bounded `tokio::sync::broadcast` ring. Publishing never waits.
//! A receiver that falls more than the capacity behind skips the overwritten
//! items and observes `RecvError::Lagged` on its next `recv()`.
//!
//! The supervisor attaches one receiver itself (the listener that feeds
//! [`SubscriberSet`](crate::SubscriberSet)); callers may attach any number of
//! additional receivers via [`Bus::subscribe`]. Events published while no
//! receiver exists are discarded.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the event broadcast channel.
///
/// Clones share the same underlying channel; publishing from several tasks
/// concurrently is fine.
#[derive(Clone, Debug)]
pub struct Bus {
    sender: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to every current receiver, without blocking.
    ///
    /// With no receivers attached the event is dropped.
    pub fn publish(&self, event: Event) {
        let _ = self.sender.send(event);
    }

    /// Attaches a fresh receiver observing events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}
