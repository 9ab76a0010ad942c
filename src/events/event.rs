//! Events describing what the supervision runtime is doing.
//!
//! A supervisor reports every observable step of its lifecycle as an
//! [`Event`] on the [`Bus`](crate::Bus): launches, exits, scheduled and
//! failed relaunches, the stop protocol, and delivery problems of the
//! subscriber machinery itself.
//!
//! Events are plain data. `seq` comes from one process-wide counter and
//! strictly orders events across supervisors sharing a bus; `at` is the
//! wall-clock time the event was built. Metadata beyond that is optional and
//! depends on the kind.
//!
//! ```rust
//! use std::time::Duration;
//! use procvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RespawnScheduled)
//!     .with_process("etcd")
//!     .with_delay(Duration::from_secs(5))
//!     .with_restarts(3);
//!
//! assert_eq!(ev.kind, EventKind::RespawnScheduled);
//! assert_eq!(ev.process.as_deref(), Some("etcd"));
//! assert_eq!(ev.delay_ms, Some(5000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Process-wide source of `Event::seq`.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened. Every kind also carries `seq` and `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A child process was spawned (first launch or relaunch).
    ///
    /// Carries `process`, `pid`, `restarts` (0 on the first launch).
    ProcessStarted,

    /// The child exited on its own, with any status.
    ///
    /// Carries `process` and the exit status text in `reason`.
    ProcessExited,

    /// A relaunch was scheduled after an exit.
    ///
    /// Carries `process`, `delay_ms`, and the `restarts` count so far.
    RespawnScheduled,

    /// A relaunch attempt failed; supervision of the process ends here.
    ///
    /// Carries `process` and the launch error text in `reason`.
    LaunchFailed,

    /// Stop was requested; the respawn loop is winding down.
    ///
    /// Carries `process`.
    StopRequested,

    /// The child ignored termination for the whole grace window and was
    /// killed.
    ///
    /// Carries `process` and `pid`.
    GraceExceeded,

    /// The respawn loop has fully exited (after stop or a terminal failure).
    ///
    /// Carries `process`.
    SupervisorStopped,

    /// A subscriber's queue rejected an event (full or closed).
    ///
    /// Carries the subscriber name in `process` and "full"/"closed" in
    /// `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Carries the subscriber name in `process` and the panic payload text in
    /// `reason`.
    SubscriberPanicked,
}

/// One runtime event plus whatever metadata its kind provides.
#[derive(Debug, Clone)]
pub struct Event {
    /// Position in the process-wide event order (monotonic).
    pub seq: u64,
    /// When the event was created.
    pub at: SystemTime,
    /// What happened.
    pub kind: EventKind,

    /// Supervised process name, or subscriber name for delivery diagnostics.
    pub process: Option<Arc<str>>,
    /// Pid of the child this event is about.
    pub pid: Option<u32>,
    /// How many relaunches have happened (0 = first launch).
    pub restarts: Option<u64>,
    /// Scheduled respawn delay, in milliseconds.
    pub delay_ms: Option<u32>,
    /// Free-form detail: exit status, error text, drop cause.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Stamps a new event of `kind` with the next sequence number and the
    /// current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: NEXT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            process: None,
            pid: None,
            restarts: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Names the process (or subscriber) the event is about.
    #[inline]
    pub fn with_process(mut self, process: impl Into<Arc<str>>) -> Self {
        self.process = Some(process.into());
        self
    }

    /// Records the child pid.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Records the relaunch count.
    #[inline]
    pub fn with_restarts(mut self, restarts: u64) -> Self {
        self.restarts = Some(restarts);
        self
    }

    /// Records the respawn delay, saturating at `u32::MAX` milliseconds.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = Some(delay.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Records free-form detail text.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Event for a queue that rejected delivery to `subscriber`.
    #[inline]
    pub(crate) fn subscriber_overflow(subscriber: &'static str, cause: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_process(subscriber)
            .with_reason(cause)
    }

    /// Event for a handler panic inside `subscriber`.
    #[inline]
    pub(crate) fn subscriber_panicked(subscriber: &'static str, payload: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_process(subscriber)
            .with_reason(payload)
    }

    /// True for [`EventKind::SubscriberOverflow`].
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for [`EventKind::SubscriberPanicked`].
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
