use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// Bootstrap a Python virtual environment and launch fileWatcher.py inside it
#[derive(Parser, Debug)]
#[command(name = "watchboot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Virtual environment directory (created on first run)
    #[arg(long, value_name = "DIR", env = "WATCHBOOT_VENV_DIR", default_value = "venv")]
    pub venv_dir: PathBuf,

    /// Dependency manifest installed into a freshly created environment
    #[arg(
        long,
        value_name = "FILE",
        env = "WATCHBOOT_REQUIREMENTS",
        default_value = "requirements.txt"
    )]
    pub requirements: PathBuf,

    /// Watcher script launched under the environment's interpreter
    #[arg(
        long,
        value_name = "FILE",
        env = "WATCHBOOT_WATCHER",
        default_value = "fileWatcher.py"
    )]
    pub watcher: PathBuf,

    /// Verify an existing environment (interpreter + manifest hash) instead
    /// of trusting it
    #[arg(long)]
    pub verify: bool,

    /// Log warnings and errors only (WATCHBOOT_QUIET=1 does the same)
    #[arg(long)]
    pub quiet: bool,

    /// Arguments passed through to the watcher, after the fixed `-r` flag.
    /// Use `--` to separate them from watchboot's own options.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}
