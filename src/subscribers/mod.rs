//! Delivering runtime events to user code.
//!
//! Implement [`Subscribe`] to observe a supervisor. The [`SubscriberSet`]
//! gives every subscriber its own bounded queue and worker task, so one slow
//! or panicking handler cannot stall the monitor loop or its siblings:
//!
//! ```text
//!   Bus ─► listener ─► SubscriberSet::emit(&Event)
//!                          ├─ try_send ─► [queue] ─► worker ─► Subscribe::on_event
//!                          ├─ try_send ─► [queue] ─► worker ─► ...
//!                          └─ full or closed queues drop the event and
//!                             report SubscriberOverflow on the bus
//! ```
//!
//! See [`Subscribe`] for a worked implementation.

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::EventLogger;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
