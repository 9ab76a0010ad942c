//! Stdout event printer.
//!
//! [`EventLogger`] is the batteries-included subscriber behind the `logging`
//! feature: it renders every [`Event`] as one line on stdout. Handy in demos
//! and while debugging a supervision setup; real deployments usually bring
//! their own [`Subscribe`] impl instead.
//!
//! One line per event, process name first:
//!
//! ```text
//! [etcd] started pid=Some(4242) restarts=Some(0)
//! [etcd] exited reason=Some("exit status: 1")
//! [etcd] respawn in delay_ms=Some(500) restarts=Some(1)
//! [etcd] stop requested
//! [etcd] supervision ended
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Prints each event as a single stdout line.
#[derive(Debug, Default)]
pub struct EventLogger;

impl EventLogger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for EventLogger {
    async fn on_event(&self, e: &Event) {
        let name = e.process.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::ProcessStarted => {
                println!("[{name}] started pid={:?} restarts={:?}", e.pid, e.restarts);
            }
            EventKind::ProcessExited => {
                println!("[{name}] exited reason={:?}", e.reason);
            }
            EventKind::RespawnScheduled => {
                println!(
                    "[{name}] respawn in delay_ms={:?} restarts={:?}",
                    e.delay_ms, e.restarts
                );
            }
            EventKind::LaunchFailed => {
                println!("[{name}] relaunch failed reason={:?}", e.reason);
            }
            EventKind::StopRequested => {
                println!("[{name}] stop requested");
            }
            EventKind::GraceExceeded => {
                println!("[{name}] grace exceeded, killing pid={:?}", e.pid);
            }
            EventKind::SupervisorStopped => {
                println!("[{name}] supervision ended");
            }
            EventKind::SubscriberOverflow => {
                println!("[{name}] subscriber queue dropped an event reason={:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[{name}] subscriber panicked info={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "EventLogger"
    }
}
