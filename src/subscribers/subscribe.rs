//! Extension point for reacting to runtime events.
//!
//! Implement [`Subscribe`] to receive everything the supervisor publishes:
//! process lifecycle, stop protocol progress, delivery diagnostics. Each
//! subscriber gets its own bounded queue and worker task (owned by
//! [`SubscriberSet`](crate::SubscriberSet)), so a slow handler delays only
//! itself; once its queue fills up, further events are dropped for it and
//! reported on the bus.
//!
//! ```
//! use async_trait::async_trait;
//! use procvisor::{Event, EventKind, Subscribe};
//!
//! /// Counts how often the child had to be relaunched.
//! struct RestartCounter;
//!
//! #[async_trait]
//! impl Subscribe for RestartCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ProcessStarted {
//!             // feed a metrics counter here
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "restart-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver half of the event fan-out.
///
/// Runs on its subscriber's dedicated worker task. Handlers should stay
/// async-friendly; anything long and blocking belongs on a blocking pool.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events reach each subscriber in publish order.
    async fn on_event(&self, event: &Event);

    /// Name used in diagnostics about this subscriber.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue; events beyond it are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
