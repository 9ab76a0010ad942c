//! # Process specification for supervised execution.
//!
//! Defines [`ProcessSpec`], a configuration bundle that describes the
//! executable to supervise and how to run it (path, arguments, working
//! directory, environment handling, respawn and stop timing).
//!
//! A spec is created with [`ProcessSpec::new`] and refined with `with_*`
//! builder methods. Path resolution, argument assembly, and directory creation
//! are the caller's responsibility; the spec carries already-resolved values.
//!
//! ## Rules
//! - The spec is immutable once handed to a [`Supervisor`](crate::Supervisor).
//! - `None` timings inherit from [`SupervisorConfig`](crate::SupervisorConfig);
//!   explicit zero means "no wait" (immediate relaunch, no stop grace).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::SupervisorConfig;

/// Specification of a supervised process.
///
/// Bundles together:
/// - The executable location and invocation (`bin_path`, `args`, `run_dir`)
/// - Environment handling (`env` extras, `data_dir`, `keep_env_prefix`)
/// - Respawn and stop timing (`timeout_respawn`, `timeout_stop`)
/// - Bookkeeping (`pid_file`) and Unix credentials (`uid`, `gid`)
///
/// The `name` identifies the process in events and diagnostics and is the
/// source of the environment override prefix: variables named
/// `<NAME_UPPERCASED>_<KEY>` override plain `<KEY>` for this process (see
/// [`merge_env`](crate::merge_env)).
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use procvisor::ProcessSpec;
///
/// let spec = ProcessSpec::new("etcd", "/var/lib/app/bin/etcd")
///     .with_args(["--data-dir", "/var/lib/app/etcd"])
///     .with_run_dir("/var/lib/app/run")
///     .with_data_dir("/var/lib/app")
///     .with_timeout_respawn(Some(Duration::from_millis(500)));
///
/// assert_eq!(spec.name(), "etcd");
/// assert_eq!(spec.args().len(), 2);
/// assert_eq!(spec.timeout_respawn(), Some(Duration::from_millis(500)));
/// ```
#[derive(Clone, Debug)]
pub struct ProcessSpec {
    name: String,
    bin_path: PathBuf,
    run_dir: PathBuf,
    data_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    timeout_respawn: Option<Duration>,
    timeout_stop: Option<Duration>,
    keep_env_prefix: bool,
    pid_file: Option<PathBuf>,
    uid: Option<u32>,
    gid: Option<u32>,
}

impl ProcessSpec {
    /// Creates a new specification for the given executable.
    ///
    /// Defaults: current directory as `run_dir`, empty `data_dir`, no
    /// arguments, no extra environment, timings inherited from the
    /// supervisor's configuration.
    pub fn new(name: impl Into<String>, bin_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            bin_path: bin_path.into(),
            run_dir: PathBuf::from("."),
            data_dir: PathBuf::new(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout_respawn: None,
            timeout_stop: None,
            keep_env_prefix: false,
            pid_file: None,
            uid: None,
            gid: None,
        }
    }

    /// Returns a new spec with the given invocation arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a new spec with the given working directory.
    pub fn with_run_dir(mut self, run_dir: impl Into<PathBuf>) -> Self {
        self.run_dir = run_dir.into();
        self
    }

    /// Returns a new spec with the given data directory.
    ///
    /// `<data_dir>/bin` is prepended to the child's `PATH`.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Returns a new spec with extra environment variables.
    ///
    /// Extras are layered onto the inherited environment before prefix
    /// resolution, so a prefixed extra behaves like a prefixed inherited
    /// variable.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Returns a new spec with an updated respawn delay.
    ///
    /// `None` inherits [`SupervisorConfig::timeout_respawn`];
    /// `Some(Duration::ZERO)` relaunches immediately.
    pub fn with_timeout_respawn(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_respawn = timeout;
        self
    }

    /// Returns a new spec with an updated stop grace window.
    ///
    /// `None` inherits [`SupervisorConfig::timeout_stop`];
    /// `Some(Duration::ZERO)` kills without waiting for termination.
    pub fn with_timeout_stop(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_stop = timeout;
        self
    }

    /// Returns a new spec with the prefixed-variable retention policy.
    ///
    /// When `true`, `<PREFIX>_<KEY>` variables are passed to the child
    /// verbatim instead of overriding the plain `<KEY>`.
    pub fn with_keep_env_prefix(mut self, keep: bool) -> Self {
        self.keep_env_prefix = keep;
        self
    }

    /// Returns a new spec with an explicit pid-file path.
    ///
    /// Defaults to `<run_dir>/<name>.pid`.
    pub fn with_pid_file(mut self, pid_file: impl Into<PathBuf>) -> Self {
        self.pid_file = Some(pid_file.into());
        self
    }

    /// Returns a new spec running the child under the given user id (Unix).
    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Returns a new spec running the child under the given group id (Unix).
    pub fn with_gid(mut self, gid: u32) -> Self {
        self.gid = Some(gid);
        self
    }

    /// Returns the process name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the executable path.
    pub fn bin_path(&self) -> &Path {
        &self.bin_path
    }

    /// Returns the working directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the invocation arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the extra environment variables.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Returns the respawn delay override, if configured.
    pub fn timeout_respawn(&self) -> Option<Duration> {
        self.timeout_respawn
    }

    /// Returns the stop grace override, if configured.
    pub fn timeout_stop(&self) -> Option<Duration> {
        self.timeout_stop
    }

    /// Returns the prefixed-variable retention policy.
    pub fn keep_env_prefix(&self) -> bool {
        self.keep_env_prefix
    }

    /// Returns the Unix user id the child runs under, if configured.
    pub fn uid(&self) -> Option<u32> {
        self.uid
    }

    /// Returns the Unix group id the child runs under, if configured.
    pub fn gid(&self) -> Option<u32> {
        self.gid
    }

    /// Returns the resolved pid-file path.
    pub fn pid_file_path(&self) -> PathBuf {
        match &self.pid_file {
            Some(path) => path.clone(),
            None => self.run_dir.join(format!("{}.pid", self.name)),
        }
    }

    /// Resolves the effective respawn delay against the runtime configuration.
    pub(crate) fn respawn_delay(&self, cfg: &SupervisorConfig) -> Duration {
        self.timeout_respawn.unwrap_or(cfg.timeout_respawn)
    }

    /// Resolves the effective stop grace against the runtime configuration.
    pub(crate) fn stop_grace(&self, cfg: &SupervisorConfig) -> Duration {
        self.timeout_stop.unwrap_or(cfg.timeout_stop)
    }
}
