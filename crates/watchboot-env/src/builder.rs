//! Build and validate the isolated Python environment.
//!
//! The happy path is a single existence check: a venv that carries the
//! completion marker is reused without touching the manifest. Everything
//! else (creation, install, recovery from partial installs) happens under
//! the creation lock.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EnvError;
use crate::lock::CreationLock;
use crate::manifest;
use crate::runner::exit_status_code;

/// Completion marker written inside the venv after a successful install.
/// A venv directory without it is a partial install and gets rebuilt.
const MARKER_FILE: &str = ".watchboot-complete.json";

/// Policy for an environment directory that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityPolicy {
    /// Marker present means the environment is trusted as-is (fast path).
    #[default]
    TrustExisting,
    /// Additionally require a live interpreter and a manifest hash matching
    /// the one recorded at install time; any mismatch rebuilds.
    AlwaysVerify,
}

/// What to build and from where.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    /// Virtual environment directory, created on first run.
    pub venv_dir: PathBuf,
    /// Dependency manifest installed into a freshly created environment.
    pub requirements: PathBuf,
    pub policy: ValidityPolicy,
}

/// Resolved environment descriptor, passed explicitly to the runner.
/// There is no ambient activation; the interpreter path is the whole
/// contract.
#[derive(Debug, Clone)]
pub struct PythonEnv {
    pub env_dir: PathBuf,
    pub python: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct Marker {
    created_at: DateTime<Utc>,
    bootstrapper_version: String,
    manifest_sha256: String,
}

/// Ensure the venv exists and is populated, creating it on first run.
///
/// Creation and install run with inherited stdio, so their output streams
/// live and failures look exactly like running the tool directly. Sub-step
/// failures abort without retry, carrying the tool's native exit code. A
/// failed install leaves no marker, so the next run removes the partial
/// venv and starts over.
pub fn ensure_environment(opts: &EnvOptions) -> Result<PythonEnv, EnvError> {
    if let Some(env) = reuse_existing(opts)? {
        return Ok(env);
    }

    let lock_path = lock_path_for(&opts.venv_dir);
    let _lock = CreationLock::acquire(&lock_path)?;

    // A concurrent bootstrap may have finished while we waited on the lock.
    if let Some(env) = reuse_existing(opts)? {
        return Ok(env);
    }

    if opts.venv_dir.exists() {
        tracing::warn!(path = %opts.venv_dir.display(), "removing incomplete environment");
        std::fs::remove_dir_all(&opts.venv_dir).map_err(|e| EnvError::IncompleteCleanup {
            path: opts.venv_dir.clone(),
            source: e,
        })?;
    }

    create_venv(&opts.venv_dir)?;
    let hash = install_requirements(&opts.venv_dir, &opts.requirements)?;
    write_marker(&opts.venv_dir, &hash)?;
    tracing::info!(path = %opts.venv_dir.display(), "environment ready");

    resolve_env(&opts.venv_dir)
}

/// Resolve the interpreter inside an environment directory.
/// Unix venvs use `bin/python`, Windows venvs `Scripts\python.exe`.
pub fn resolve_env(env_dir: &Path) -> Result<PythonEnv, EnvError> {
    let unix = env_dir.join("bin").join("python");
    let windows = env_dir.join("Scripts").join("python.exe");
    let python = if unix.exists() {
        unix
    } else if windows.exists() {
        windows
    } else {
        return Err(EnvError::MissingInterpreter {
            path: env_dir.to_path_buf(),
        });
    };
    Ok(PythonEnv {
        env_dir: env_dir.to_path_buf(),
        python,
    })
}

fn reuse_existing(opts: &EnvOptions) -> Result<Option<PythonEnv>, EnvError> {
    let marker = match read_marker(&opts.venv_dir) {
        Some(m) => m,
        None => return Ok(None),
    };

    if opts.policy == ValidityPolicy::AlwaysVerify {
        let env = match resolve_env(&opts.venv_dir) {
            Ok(env) => env,
            Err(_) => {
                tracing::warn!(path = %opts.venv_dir.display(), "interpreter missing, rebuilding");
                return Ok(None);
            }
        };
        let current = manifest::content_hash(&opts.requirements)?;
        if current != marker.manifest_sha256 {
            tracing::info!("manifest changed since install, rebuilding environment");
            return Ok(None);
        }
        tracing::debug!(path = %opts.venv_dir.display(), "environment verified");
        return Ok(Some(env));
    }

    // Trust-existing fast path: no manifest read, no integrity probe.
    tracing::debug!(path = %opts.venv_dir.display(), "reusing existing environment");
    resolve_env(&opts.venv_dir).map(Some)
}

fn create_venv(env_dir: &Path) -> Result<(), EnvError> {
    let python = system_python()?;
    tracing::info!(python = %python.display(), path = %env_dir.display(), "creating virtual environment");
    let status = Command::new(&python)
        .arg("-m")
        .arg("venv")
        .arg(env_dir)
        .status()?;
    if !status.success() {
        return Err(EnvError::VenvCreation {
            code: exit_status_code(status),
        });
    }
    Ok(())
}

/// Install the manifest into the venv with its own pip, streaming its
/// output. pip is always invoked on first creation, so a missing or
/// malformed manifest fails natively through pip. Returns the manifest
/// hash recorded in the marker.
fn install_requirements(env_dir: &Path, requirements: &Path) -> Result<String, EnvError> {
    let env = resolve_env(env_dir)?;
    match std::fs::read_to_string(requirements) {
        Ok(content) => {
            tracing::info!(count = manifest::parse(&content).len(), "installing dependencies")
        }
        Err(_) => {
            tracing::warn!(manifest = %requirements.display(), "manifest unreadable, pip will report")
        }
    }
    let status = Command::new(&env.python)
        .args(["-m", "pip", "install", "-r"])
        .arg(requirements)
        .status()?;
    if !status.success() {
        return Err(EnvError::DependencyInstall {
            code: exit_status_code(status),
        });
    }
    manifest::content_hash(requirements)
}

fn system_python() -> Result<PathBuf, EnvError> {
    which::which("python3")
        .or_else(|_| which::which("python"))
        .map_err(EnvError::InterpreterNotFound)
}

fn lock_path_for(env_dir: &Path) -> PathBuf {
    let name = env_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "venv".to_string());
    env_dir.with_file_name(format!("{name}.lock"))
}

fn marker_path(env_dir: &Path) -> PathBuf {
    env_dir.join(MARKER_FILE)
}

fn read_marker(env_dir: &Path) -> Option<Marker> {
    let raw = std::fs::read_to_string(marker_path(env_dir)).ok()?;
    serde_json::from_str(&raw).ok()
}

fn write_marker(env_dir: &Path, manifest_sha256: &str) -> Result<(), EnvError> {
    let marker = Marker {
        created_at: Utc::now(),
        bootstrapper_version: env!("CARGO_PKG_VERSION").to_string(),
        manifest_sha256: manifest_sha256.to_string(),
    };
    let json = serde_json::to_string_pretty(&marker)?;
    std::fs::write(marker_path(env_dir), json)?;
    Ok(())
}
