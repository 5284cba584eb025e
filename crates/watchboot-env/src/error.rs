use std::path::PathBuf;

use thiserror::Error;

/// Bootstrap failures, one variant per pipeline stage.
///
/// Nothing is retried or translated. Sub-steps (`python -m venv`, pip) run
/// with inherited stdio, so their variants carry only the native exit code;
/// the diagnostics already reached the terminal. Failures internal to the
/// bootstrapper get their own codes and a one-line message instead.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("no python interpreter found in PATH")]
    InterpreterNotFound(#[source] which::Error),

    #[error("venv creation failed with exit code {code}")]
    VenvCreation { code: i32 },

    #[error("dependency install failed with exit code {code}")]
    DependencyInstall { code: i32 },

    #[error("cannot read manifest {path}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot acquire creation lock {path}")]
    LockAcquire {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("another bootstrap holds {path}; gave up after {waited_secs}s")]
    LockTimeout { path: PathBuf, waited_secs: u64 },

    #[error("cannot remove incomplete environment {path}")]
    IncompleteCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("environment {path} exists but has no usable interpreter")]
    MissingInterpreter { path: PathBuf },

    #[error("cannot encode completion marker")]
    MarkerEncode(#[from] serde_json::Error),

    #[error("failed to launch {program}")]
    TargetSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Process exit code for this failure. Sub-step failures propagate the
    /// failing tool's own code unchanged; bootstrapper-internal failures
    /// get a stable code per stage. Target exit codes never pass through
    /// here — a target that ran and exited non-zero is returned verbatim
    /// by the runner, not reported as an `EnvError`.
    pub fn exit_code(&self) -> i32 {
        match self {
            EnvError::VenvCreation { code } | EnvError::DependencyInstall { code } => *code,
            EnvError::InterpreterNotFound(_) => 10,
            EnvError::ManifestRead { .. } => 12,
            EnvError::LockAcquire { .. } | EnvError::LockTimeout { .. } => 13,
            EnvError::IncompleteCleanup { .. }
            | EnvError::MissingInterpreter { .. }
            | EnvError::MarkerEncode(_) => 14,
            EnvError::TargetSpawn { .. } => 15,
            EnvError::Io(_) => 1,
        }
    }

    /// Whether the failing sub-step already wrote its diagnostics to the
    /// inherited stderr. The caller must not add a wrapper message then.
    pub fn child_reported(&self) -> bool {
        matches!(
            self,
            EnvError::VenvCreation { .. } | EnvError::DependencyInstall { .. }
        )
    }
}
