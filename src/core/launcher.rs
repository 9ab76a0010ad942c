//! # Launcher: one synchronous spawn attempt.
//!
//! Translates a [`ProcessSpec`] into a running OS child. Exactly one attempt;
//! a failure (missing binary, non-executable path, missing working directory,
//! permission denied) is returned to the caller without any retry. Monitoring
//! is not this module's job.
//!
//! The child environment is composed freshly on every call: the inherited
//! process environment, overlaid with the spec's extras, then run through
//! [`merge_env`](crate::merge_env) so prefixed overrides and the `PATH`
//! rebuild apply.

use std::collections::HashMap;

use tokio::process::{Child, Command};

use crate::env::merge_env;
use crate::error::SuperviseError;
use crate::process::ProcessSpec;

/// Spawns the spec's executable once.
///
/// The child is detached into its own process group on Unix so that signals
/// aimed at the supervisor's group do not reach it directly; the stop protocol
/// owns its termination. Stdin is closed; stdout/stderr are inherited.
pub(crate) fn launch(spec: &ProcessSpec) -> Result<Child, SuperviseError> {
    let env = command_env(spec);

    let mut cmd = Command::new(spec.bin_path());
    cmd.args(spec.args())
        .current_dir(spec.run_dir())
        .env_clear()
        .envs(&env)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true);

    #[cfg(unix)]
    {
        cmd.process_group(0);
        if let Some(uid) = spec.uid() {
            cmd.uid(uid);
        }
        if let Some(gid) = spec.gid() {
            cmd.gid(gid);
        }
    }

    cmd.spawn().map_err(|source| SuperviseError::Launch {
        name: spec.name().to_string(),
        source,
    })
}

/// Composes the merged child environment for the spec.
///
/// Inherited values that are not valid UTF-8 are converted lossily; the
/// ambient environment is not under this crate's control.
fn command_env(spec: &ProcessSpec) -> HashMap<String, String> {
    let mut base: HashMap<String, String> = std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();
    base.extend(spec.env().iter().map(|(k, v)| (k.clone(), v.clone())));
    merge_env(&base, spec.data_dir(), spec.name(), spec.keep_env_prefix())
}
