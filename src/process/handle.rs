//! # Pid snapshot of a supervised child.
//!
//! [`ProcessHandle`] is a cheap, copyable identity snapshot of the process the
//! respawn loop currently owns. The waitable OS handle stays inside the loop;
//! callers observe the child through this snapshot only.
//!
//! ## Rules
//! - The handle is a **snapshot**: the child may exit at any moment after it
//!   was taken, and its pid may in principle be reused by the OS afterwards.
//!   [`ProcessHandle::is_alive`] is therefore a liveness probe, not a proof of
//!   identity.
//! - Signalling helpers are crate-internal; termination goes through
//!   [`Supervisor::stop`](crate::Supervisor::stop).

#[cfg(unix)]
use std::io;

#[cfg(unix)]
use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};

/// Identity snapshot of a running child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle {
    pid: u32,
}

impl ProcessHandle {
    pub(crate) fn new(pid: u32) -> Self {
        Self { pid }
    }

    /// Returns the OS process id.
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// Probes whether a process with this pid currently exists (signal 0).
    ///
    /// Unix only; always `false` on other targets.
    #[cfg(unix)]
    pub fn is_alive(&self) -> bool {
        signal::kill(Pid::from_raw(self.pid as i32), None).is_ok()
    }

    #[cfg(not(unix))]
    pub fn is_alive(&self) -> bool {
        false
    }

    /// Sends SIGTERM to the process.
    ///
    /// An already-gone process (ESRCH) is not a failure: the goal of
    /// termination has been reached.
    #[cfg(unix)]
    pub(crate) fn send_term(&self) -> io::Result<()> {
        match signal::kill(Pid::from_raw(self.pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(io::Error::from_raw_os_error(errno as i32)),
        }
    }
}
