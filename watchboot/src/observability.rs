//! Tracing init.
//!
//! Uses `config::ObservabilityConfig` for WATCHBOOT_LOG_LEVEL,
//! WATCHBOOT_LOG_JSON and WATCHBOOT_QUIET. Everything goes to stderr so the
//! watcher's own stdout stays clean.

use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call once at process startup.
/// Quiet mode (CLI flag or WATCHBOOT_QUIET=1) limits output to WARN and up.
pub fn init_tracing(quiet_cli: bool) {
    let cfg = ObservabilityConfig::from_env();
    let level = if quiet_cli || cfg.quiet {
        "watchboot=warn,watchboot_env=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };
}
