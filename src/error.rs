//! Error types used by the supervision runtime.
//!
//! This module defines [`SuperviseError`], the only error surface of the crate.
//! It covers the two conditions that prevent a supervisor from doing its job:
//! the managed executable could not be started, or a live process could not be
//! signalled during shutdown.
//!
//! A child exiting on its own, with any status, is **not** an error: it is the
//! normal trigger for a relaunch and is reported through the event stream only.
//!
//! The type provides helper methods (`as_label`, `as_message`) for logging/metrics.

use std::io;

use thiserror::Error;

/// # Errors produced by supervisor operations.
///
/// Raised synchronously from [`Supervisor::start`](crate::Supervisor::start)
/// and [`Supervisor::stop`](crate::Supervisor::stop). Relaunch failures inside
/// the background respawn loop are never surfaced here; they terminate the loop
/// and are reported as [`EventKind::LaunchFailed`](crate::EventKind::LaunchFailed).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SuperviseError {
    /// The executable could not be started (bad path, not executable,
    /// missing working directory, permission denied).
    #[error("failed to launch '{name}': {source}")]
    Launch {
        /// Name of the supervised process.
        name: String,
        /// The underlying spawn error.
        source: io::Error,
    },

    /// A live process could not be sent a termination signal during `stop`.
    ///
    /// A process that is already gone is never reported as this error.
    #[error("failed to terminate '{name}' (pid {pid}): {source}")]
    Terminate {
        /// Name of the supervised process.
        name: String,
        /// Pid the signal was addressed to.
        pid: u32,
        /// The underlying signalling error.
        source: io::Error,
    },
}

impl SuperviseError {
    /// Stable snake_case label, suitable as a metric or log field.
    ///
    /// # Example
    /// ```
    /// use std::io;
    /// use procvisor::SuperviseError;
    ///
    /// let err = SuperviseError::Launch {
    ///     name: "etcd".into(),
    ///     source: io::Error::from(io::ErrorKind::NotFound),
    /// };
    /// assert_eq!(err.as_label(), "launch_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SuperviseError::Launch { .. } => "launch_failed",
            SuperviseError::Terminate { .. } => "terminate_failed",
        }
    }

    /// Full prose description, including the underlying OS error.
    pub fn as_message(&self) -> String {
        match self {
            SuperviseError::Launch { name, source } => {
                format!("launch '{name}' failed: {source}")
            }
            SuperviseError::Terminate { name, pid, source } => {
                format!("terminate '{name}' (pid {pid}) failed: {source}")
            }
        }
    }
}
