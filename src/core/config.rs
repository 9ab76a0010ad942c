//! Runtime defaults shared by every process a supervisor runs.
//!
//! [`SupervisorConfig`] holds the timing knobs of the respawn loop and the
//! event bus size. A [`ProcessSpec`](crate::ProcessSpec) may override the
//! timings per process; `None` there means "use the config value".
//!
//! Zero durations are real values, not "unset": a zero respawn delay
//! relaunches immediately, and a zero stop grace kills the child right after
//! the termination request.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use procvisor::SupervisorConfig;
//!
//! let mut cfg = SupervisorConfig::default();
//! cfg.timeout_respawn = Duration::from_millis(500);
//! cfg.timeout_stop = Duration::from_secs(10);
//!
//! assert_eq!(cfg.bus_capacity, 1024);
//! ```

use std::time::Duration;

/// Timing and event-delivery defaults for a supervisor.
///
/// All fields are public; construct with [`Default`] and adjust what you
/// need.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Delay between a child exit and its relaunch, for specs that do not
    /// set their own. Zero relaunches immediately.
    pub timeout_respawn: Duration,

    /// How long the stop protocol waits for the child to honor termination
    /// before killing it (and publishing
    /// [`EventKind::GraceExceeded`](crate::EventKind::GraceExceeded)).
    pub timeout_stop: Duration,

    /// Ring size of the broadcast event bus. Subscribers that fall further
    /// behind than this skip the missed events. Values below 1 are raised
    /// to 1.
    pub bus_capacity: usize,
}

impl Default for SupervisorConfig {
    /// Five seconds of respawn delay and stop grace, 1024 bus slots.
    fn default() -> Self {
        Self {
            timeout_respawn: Duration::from_secs(5),
            timeout_stop: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
