//! Python environment bootstrap for the file-watcher launcher.
//!
//! Creates a local `venv`, installs the `requirements.txt` manifest into it,
//! and resolves the interpreter used to launch the target script. The
//! environment is an explicit value ([`PythonEnv`]) handed to the runner,
//! never ambient process state.

pub mod builder;
pub mod error;
pub mod lock;
pub mod manifest;
pub mod runner;

pub use builder::{ensure_environment, EnvOptions, PythonEnv, ValidityPolicy};
pub use error::EnvError;
