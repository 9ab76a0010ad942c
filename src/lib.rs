//! # procvisor
//!
//! Keep one external process running.
//!
//! A [`Supervisor`] owns a single child described by a [`ProcessSpec`]. It
//! launches the child, waits on it, relaunches it after every exit, and on
//! [`stop`](Supervisor::stop) walks the termination ladder: SIGTERM, a grace
//! window, then a kill. Stop is race-free against the respawn loop: a stop
//! that lands mid-delay cancels the pending relaunch, and `stop().await`
//! returns only once the child is gone and the loop has exited.
//! Higher-level orchestrators run one supervisor per component.
//!
//! Each launch rebuilds the child environment through [`merge_env`]:
//! variables prefixed with the upper-cased process name override their plain
//! counterparts, and `PATH` is re-rooted under the spec's data directory.
//!
//! ## How the pieces connect
//! ```text
//! ProcessSpec ──► Supervisor ──► Monitor (respawn loop) ──► child process
//!                     │                   │
//!               start()/stop()      publishes lifecycle events
//!                     │                   │
//!                     ▼                   ▼
//!                  Bus (broadcast ring, SupervisorConfig::bus_capacity)
//!                     │
//!                     ▼
//!              listener task ──► SubscriberSet ──► one queue + worker
//!              (in Supervisor)                     per Subscribe impl
//! ```
//!
//! ### The respawn loop
//! ```text
//! Supervisor::start() ──► launch (synchronous, errors go to the caller)
//!                            │
//!                            ▼
//! loop {
//!   ├─► wait for child exit (cancellable; cancellation wins ties)
//!   │       ├─ stop requested ──► reap child (grace, then kill), exit loop
//!   │       └─ child exited   ──► publish ProcessExited
//!   ├─► publish RespawnScheduled{ delay, restarts }
//!   ├─► sleep(timeout_respawn) (cancellable)
//!   │       └─ stop requested ──► exit loop, no relaunch
//!   └─► relaunch with freshly merged environment
//!         ├─ Ok  ──► publish ProcessStarted{ pid, restarts }, continue
//!         └─ Err ──► publish LaunchFailed, exit loop (terminal)
//! }
//!
//! on exit: running = false, handle cleared, publish SupervisorStopped
//! ```
//!
//! ## Surface
//! - [`Supervisor`] / [`SupervisorBuilder`]: lifecycle operations and the
//!   stop barrier.
//! - [`ProcessSpec`] / [`ProcessHandle`]: what to run, and the pid snapshot
//!   of what is currently running.
//! - [`merge_env`]: the environment composition rules, usable standalone.
//! - [`Subscribe`] / [`SubscriberSet`] / [`Bus`] / [`Event`]: observation.
//! - [`SuperviseError`]: launch and termination failures.
//! - [`SupervisorConfig`]: respawn delay, stop grace, bus capacity.
//!
//! ## Feature flags
//! - `logging`: ships [`EventLogger`], a stdout subscriber for demos.
//!
//! ## Quick start
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use procvisor::{ProcessSpec, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::default();
//!     cfg.timeout_respawn = Duration::from_secs(1);
//!
//!     // Observability is optional; this wires the demo logger when enabled.
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn procvisor::Subscribe>> = {
//!         use procvisor::EventLogger;
//!         vec![Arc::new(EventLogger::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn procvisor::Subscribe>> = Vec::new();
//!
//!     // The name doubles as the env override prefix, so
//!     // WORKER_RUST_LOG=debug reaches this child as RUST_LOG=debug.
//!     let spec = ProcessSpec::new("worker", "/usr/local/bin/worker")
//!         .with_args(["--config", "/etc/worker.yaml"])
//!         .with_run_dir("/var/lib/worker");
//!
//!     let sup = Supervisor::builder(spec)
//!         .with_config(cfg)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     // First launch is synchronous; a bad path errors here.
//!     sup.start().await?;
//!
//!     // ... the monitor keeps the process alive in the background ...
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!
//!     // Barrier: returns once the child is gone and the loop has exited.
//!     sup.stop().await?;
//!     assert!(sup.process().await.is_none());
//!     Ok(())
//! }
//! ```
mod core;
mod env;
mod error;
mod events;
mod process;
mod subscribers;

pub use crate::core::{Supervisor, SupervisorBuilder, SupervisorConfig};
pub use env::merge_env;
pub use error::SuperviseError;
pub use events::{Bus, Event, EventKind};
pub use process::{ProcessHandle, ProcessSpec};
pub use subscribers::{Subscribe, SubscriberSet};

#[cfg(feature = "logging")]
pub use subscribers::EventLogger;
