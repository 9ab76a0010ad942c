//! The supervisor itself: one process, its respawn loop, its stop switch.
//!
//! [`Supervisor::start`] performs the first launch synchronously, so a bad
//! executable path or working directory comes back to the caller instead of
//! dying inside a background task. The spawned [`Monitor`] then owns the
//! child and relaunches it after every exit until [`Supervisor::stop`]
//! cancels it.
//!
//! ```text
//! start():
//!   launch(spec) ──ok──► state.handle = pid, pid file, ProcessStarted
//!        │                      └──► spawn Monitor::run(child, token)
//!        └──err──► SuperviseError::Launch (no task, no state change)
//!
//! stop():
//!   publish StopRequested
//!   token.cancel() ───────────► monitor wait/sleep unblocks, no relaunch
//!   SIGTERM to pid snapshot ──► child exits (or is killed after the grace)
//!   join monitor ─────────────► barrier: process() is now None, loop is gone
//! ```
//!
//! The supervisor also owns the [`Bus`] and, once started, a listener task
//! that drains it into the [`SubscriberSet`]. The `subscribers` module
//! documents the fan-out shape.
//!
//! Typical embedding:
//! ```no_run
//! use std::time::Duration;
//! use procvisor::{ProcessSpec, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::default();
//!     cfg.timeout_respawn = Duration::from_millis(500);
//!
//!     let spec = ProcessSpec::new("worker", "/usr/local/bin/worker")
//!         .with_args(["--verbose"])
//!         .with_run_dir("/var/lib/worker");
//!
//!     let sup = Supervisor::builder(spec).with_config(cfg).build();
//!     sup.start().await?;
//!
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!
//!     sup.stop().await?;
//!     assert!(sup.process().await.is_none());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::builder::SupervisorBuilder;
use crate::core::config::SupervisorConfig;
use crate::core::launcher;
use crate::core::monitor::{Monitor, ProcessState};
use crate::error::SuperviseError;
use crate::events::{Bus, Event, EventKind};
use crate::process::{ProcessHandle, ProcessSpec};
use crate::subscribers::SubscriberSet;

/// Started-instance handles: the stop switch and the monitor to join.
struct Lifecycle {
    cancel: CancellationToken,
    monitor: JoinHandle<()>,
}

/// Supervises one external process: respawn loop, stop protocol, events.
///
/// All operations take `&self` and are safe to call concurrently; the
/// instance is typically shared as an `Arc` (as returned by
/// [`SupervisorBuilder::build`]).
///
/// Stopping is explicit: dropping a running supervisor does not stop the
/// respawn loop. Call [`Supervisor::stop`] first.
pub struct Supervisor {
    spec: ProcessSpec,
    cfg: SupervisorConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    state: Arc<RwLock<ProcessState>>,
    lifecycle: Mutex<Option<Lifecycle>>,
    listener_started: AtomicBool,
}

impl Supervisor {
    /// Creates a supervisor with default configuration and no subscribers.
    pub fn new(spec: ProcessSpec) -> Self {
        let cfg = SupervisorConfig::default();
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(Vec::new(), bus.clone()));
        Self::new_internal(spec, cfg, bus, subs)
    }

    /// Starts building a supervisor with custom configuration or subscribers.
    pub fn builder(spec: ProcessSpec) -> SupervisorBuilder {
        SupervisorBuilder::new(spec)
    }

    pub(crate) fn new_internal(
        spec: ProcessSpec,
        cfg: SupervisorConfig,
        bus: Bus,
        subs: Arc<SubscriberSet>,
    ) -> Self {
        Self {
            spec,
            cfg,
            bus,
            subs,
            state: Arc::new(RwLock::new(ProcessState::idle())),
            lifecycle: Mutex::new(None),
            listener_started: AtomicBool::new(false),
        }
    }

    /// Launches the process and starts supervising it.
    ///
    /// The first launch happens synchronously: on failure the error is
    /// returned, no background task exists, and the instance remains fully
    /// stopped. On success the monitor task owns the child and the call
    /// returns without waiting for the child to finish.
    ///
    /// Calling `start` while already supervising is a no-op returning `Ok`.
    /// After `stop` (or after the loop ended on a failed relaunch), `start`
    /// may be called again to begin a fresh supervision run.
    pub async fn start(&self) -> Result<(), SuperviseError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(current) = lifecycle.take() {
            if self.state.read().await.running {
                *lifecycle = Some(current);
                return Ok(());
            }
            // A monitor observed not running ended on its own (terminal
            // relaunch failure) and is past its final state write, so this
            // join cannot block. Reap it and start fresh.
            let _ = current.monitor.await;
        }
        self.spawn_listener();

        let child = launcher::launch(&self.spec)?;
        let monitor = Monitor::new(
            self.spec.clone(),
            self.cfg.clone(),
            self.bus.clone(),
            Arc::clone(&self.state),
        );
        monitor.register(&child, 0).await;

        let cancel = CancellationToken::new();
        let join = tokio::spawn(monitor.run(child, cancel.clone()));
        *lifecycle = Some(Lifecycle {
            cancel,
            monitor: join,
        });
        Ok(())
    }

    /// Stops the supervised process and the respawn loop.
    ///
    /// Safe to call at any point of the loop's lifecycle: before any start,
    /// while the child runs, while the loop waits out the respawn delay, or
    /// repeatedly. Without anything to stop it returns `Ok` immediately.
    ///
    /// The call is a synchronization barrier: it raises the cancellation
    /// signal, sends the termination signal to the live child (if any), and
    /// returns only after the monitor task has observably exited. Afterwards
    /// [`Supervisor::process`] returns `None` and no further relaunch occurs.
    ///
    /// An error is returned only when signalling a live process failed for a
    /// reason other than "already gone"; even then the loop is torn down
    /// before the error is reported.
    pub async fn stop(&self) -> Result<(), SuperviseError> {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(Lifecycle { cancel, monitor }) = lifecycle.take() else {
            return Ok(());
        };

        self.bus
            .publish(Event::new(EventKind::StopRequested).with_process(self.spec.name()));
        cancel.cancel();

        let handle = self.state.read().await.handle;
        let termination = handle.and_then(|handle| {
            self.terminate(handle)
                .err()
                .map(|source| SuperviseError::Terminate {
                    name: self.spec.name().to_string(),
                    pid: handle.id(),
                    source,
                })
        });

        let _ = monitor.await;
        match termination {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns a snapshot of the currently running child, if any.
    ///
    /// `None` covers every ownerless moment: before start, the gap between an
    /// exit and the relaunch, and after stop.
    pub async fn process(&self) -> Option<ProcessHandle> {
        self.state.read().await.handle
    }

    /// True from a successful `start` until the respawn loop exits.
    pub async fn is_running(&self) -> bool {
        self.state.read().await.running
    }

    /// Returns the event bus (for attaching ad-hoc receivers).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the process specification this supervisor runs.
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    #[cfg(unix)]
    fn terminate(&self, handle: ProcessHandle) -> std::io::Result<()> {
        handle.send_term()
    }

    /// Termination is driven by the monitor's kill path on non-Unix targets.
    #[cfg(not(unix))]
    fn terminate(&self, _handle: ProcessHandle) -> std::io::Result<()> {
        Ok(())
    }

    /// Spawns the task that drains the bus into the subscriber set.
    ///
    /// Runs once, on the first start with subscribers present; the task lives
    /// for the runtime's lifetime and keeps draining across stop/start
    /// cycles.
    fn spawn_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        if self.listener_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}
