//! Runtime core: launch, monitoring and lifecycle.
//!
//! This module contains the embedded implementation of the supervision
//! runtime. The public API from this module is [`Supervisor`] (with its
//! builder and configuration), which owns one process's respawn loop and stop
//! protocol.
//!
//! Internal modules:
//! - [`launcher`]: one synchronous spawn attempt with the merged environment;
//! - [`monitor`]: the respawn loop task (wait, delay, relaunch, reap);
//! - [`supervisor`]: start/stop/query surface and event fan-out wiring;
//! - [`config`]: runtime defaults (respawn delay, stop grace, bus capacity);
//! - [`builder`]: assembly of bus, subscribers and supervisor.

mod builder;
mod config;
mod launcher;
mod monitor;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use supervisor::Supervisor;
