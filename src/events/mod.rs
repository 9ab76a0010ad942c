//! Event model and the broadcast channel that carries it.
//!
//! [`Event`] is the payload, [`EventKind`] says what happened, and [`Bus`]
//! moves them: a thin layer over `tokio::sync::broadcast` that the
//! supervisor, the monitor loop, and the subscriber workers all publish
//! into. The supervisor's listener is the usual consumer; [`Bus::subscribe`]
//! hands out extra receivers for anyone else.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
