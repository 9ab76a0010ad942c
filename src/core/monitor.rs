//! # Monitor: the respawn loop for one supervised process.
//!
//! Watches the child the supervisor launched, relaunches it after every exit,
//! and honors cooperative cancellation from the stop protocol via
//! [`CancellationToken`].
//!
//! ## Event flow
//! For each loop turn, the monitor publishes:
//! ```text
//! [child exits]  → ProcessExited → RespawnScheduled → [sleep] → ProcessStarted
//!                                                             → LaunchFailed (terminal)
//! [stop request] → (GraceExceeded if the child ignores termination)
//!
//! On loop exit (any path): SupervisorStopped
//! ```
//!
//! ## Loop shape
//! ```text
//! ProcessSpec ──► Supervisor::start() ──► Monitor::run(child, token)
//!
//! loop {
//!   ├─► select! { child.wait() | cancelled() }   (biased: cancellation wins ties)
//!   │     ├─► cancelled  → reap child (grace, then kill), exit loop
//!   │     └─► exited     → clear handle, remove pid file, publish ProcessExited
//!   ├─► publish RespawnScheduled
//!   ├─► select! { sleep(delay) | cancelled() }   (biased)
//!   │     └─► cancelled  → exit loop, no relaunch
//!   └─► relaunch with a freshly merged environment
//!         ├─► Ok  → register handle, publish ProcessStarted, continue
//!         └─► Err → publish LaunchFailed, exit loop (terminal)
//! }
//! ```
//!
//! ## Rules
//! - At most one child is owned at any time; the waitable [`Child`] never
//!   leaves this task.
//! - Cancellation is checked at **both** suspension points (child wait,
//!   respawn sleep); whenever stop has been requested, cancellation wins even
//!   if the child exits at nearly the same instant.
//! - A relaunch failure is **terminal**: there is no caller left to report to,
//!   and retrying a permanently broken path would busy-spin. The failure is
//!   published and the loop ends with `running = false`.
//! - A stop request that races an in-flight relaunch is still honored: the
//!   fresh child is reaped through the grace path before the loop exits.

use std::sync::Arc;

use tokio::{process::Child, sync::RwLock, time};
use tokio_util::sync::CancellationToken;

use crate::core::{SupervisorConfig, launcher};
use crate::events::{Bus, Event, EventKind};
use crate::process::{ProcessHandle, ProcessSpec};

/// Shared snapshot state between the supervisor and its monitor.
pub(crate) struct ProcessState {
    /// Pid snapshot of the live child, if any.
    pub(crate) handle: Option<ProcessHandle>,
    /// True while the respawn loop is active.
    pub(crate) running: bool,
}

impl ProcessState {
    pub(crate) fn idle() -> Self {
        Self {
            handle: None,
            running: false,
        }
    }
}

/// Drives the respawn loop of a single supervised process.
pub(crate) struct Monitor {
    spec: ProcessSpec,
    cfg: SupervisorConfig,
    bus: Bus,
    state: Arc<RwLock<ProcessState>>,
}

impl Monitor {
    pub(crate) fn new(
        spec: ProcessSpec,
        cfg: SupervisorConfig,
        bus: Bus,
        state: Arc<RwLock<ProcessState>>,
    ) -> Self {
        Self {
            spec,
            cfg,
            bus,
            state,
        }
    }

    /// Records a freshly spawned child: pid snapshot, pid file, start event.
    pub(crate) async fn register(&self, child: &Child, restarts: u64) {
        // A freshly spawned child always has a pid; `None` would mean it was
        // already reaped, which cannot happen before the first wait.
        let handle = child.id().map(ProcessHandle::new);
        {
            let mut state = self.state.write().await;
            state.handle = handle;
            state.running = true;
        }
        if let Some(handle) = handle {
            write_pid_file(&self.spec, handle.id());
            self.bus.publish(
                Event::new(EventKind::ProcessStarted)
                    .with_process(self.spec.name())
                    .with_pid(handle.id())
                    .with_restarts(restarts),
            );
        }
    }

    /// Runs the loop until stop is requested or a relaunch fails.
    ///
    /// Takes ownership of the child spawned by `start`; every subsequent child
    /// is spawned and owned here.
    pub(crate) async fn run(self, mut child: Child, cancel: CancellationToken) {
        let mut restarts: u64 = 0;

        loop {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                status = child.wait() => Some(status),
            };
            let Some(status) = status else {
                self.reap(child).await;
                break;
            };

            self.clear_handle().await;
            remove_pid_file(&self.spec);
            let reason = match &status {
                Ok(status) => status.to_string(),
                Err(err) => format!("wait failed: {err}"),
            };
            self.bus.publish(
                Event::new(EventKind::ProcessExited)
                    .with_process(self.spec.name())
                    .with_reason(reason),
            );

            let delay = self.spec.respawn_delay(&self.cfg);
            self.bus.publish(
                Event::new(EventKind::RespawnScheduled)
                    .with_process(self.spec.name())
                    .with_delay(delay)
                    .with_restarts(restarts),
            );
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            let cancelled = tokio::select! {
                biased;
                _ = cancel.cancelled() => true,
                _ = &mut sleep => false,
            };
            if cancelled {
                break;
            }

            restarts += 1;
            match launcher::launch(&self.spec) {
                Ok(next) => {
                    self.register(&next, restarts).await;
                    child = next;
                }
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::LaunchFailed)
                            .with_process(self.spec.name())
                            .with_reason(err.as_message()),
                    );
                    break;
                }
            }
        }

        self.finish().await;
    }

    /// Reaps a child after stop: terminate, wait out the grace window, kill.
    ///
    /// `stop` already signalled its pid snapshot, but a child spawned by a
    /// relaunch that raced the cancellation was never in that snapshot. The
    /// signal is idempotent and tolerates an already-gone child, so it is
    /// sent here unconditionally.
    async fn reap(&self, mut child: Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            let _ = ProcessHandle::new(pid).send_term();
        }
        let grace = self.spec.stop_grace(&self.cfg);
        if time::timeout(grace, child.wait()).await.is_err() {
            if let Some(pid) = child.id() {
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_process(self.spec.name())
                        .with_pid(pid),
                );
            }
            let _ = child.kill().await;
        }
        remove_pid_file(&self.spec);
    }

    async fn clear_handle(&self) {
        self.state.write().await.handle = None;
    }

    /// Final state transition of the loop, on every exit path.
    async fn finish(&self) {
        {
            let mut state = self.state.write().await;
            state.handle = None;
            state.running = false;
        }
        self.bus.publish(
            Event::new(EventKind::SupervisorStopped).with_process(self.spec.name()),
        );
    }
}

/// Records the child pid; failures are non-fatal bookkeeping problems.
fn write_pid_file(spec: &ProcessSpec, pid: u32) {
    let _ = std::fs::write(spec.pid_file_path(), format!("{pid}\n"));
}

fn remove_pid_file(spec: &ProcessSpec) {
    let _ = std::fs::remove_file(spec.pid_file_path());
}
