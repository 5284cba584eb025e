//! Launch the target watcher under the bootstrapped interpreter.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::builder::PythonEnv;
use crate::error::EnvError;

/// Flag always prepended to the target's arguments: watch recursively.
pub const RECURSIVE_FLAG: &str = "-r";

/// Build the target invocation: `<venv python> <script> -r <args...>`.
/// Caller arguments follow the fixed flag unmodified and in order.
pub fn watcher_command(env: &PythonEnv, script: &Path, extra_args: &[OsString]) -> Command {
    let mut cmd = Command::new(&env.python);
    cmd.arg(script).arg(RECURSIVE_FLAG).args(extra_args);
    cmd
}

/// Run the target with inherited stdio and return its exit code verbatim.
/// A child killed by signal N reports 128+N, as shells do.
pub fn run_watcher(env: &PythonEnv, script: &Path, extra_args: &[OsString]) -> Result<i32, EnvError> {
    let mut cmd = watcher_command(env, script, extra_args);
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    tracing::debug!(
        env = %env.env_dir.display(),
        python = %env.python.display(),
        script = %script.display(),
        "launching watcher"
    );
    let status = cmd.status().map_err(|e| EnvError::TargetSpawn {
        program: script.to_path_buf(),
        source: e,
    })?;
    Ok(exit_status_code(status))
}

/// Exit code of a finished child, usable as our own exit status.
/// A child killed by signal N maps to 128+N, as shells report it.
pub(crate) fn exit_status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}
