//! Environment-variable configuration.
//!
//! All env reads live here; the rest of the binary goes through structured
//! config instead of `std::env::var`. CLI flags (which carry their own
//! `env =` fallbacks via clap) take precedence.

use std::env;

pub const ENV_LOG_LEVEL: &str = "WATCHBOOT_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "WATCHBOOT_LOG_JSON";
pub const ENV_QUIET: &str = "WATCHBOOT_QUIET";

const DEFAULT_LOG_LEVEL: &str = "watchboot=info,watchboot_env=info";

/// Logging configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_json: bool,
    pub quiet: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            log_json: env_bool(ENV_LOG_JSON),
            quiet: env_bool(ENV_QUIET),
        }
    }
}

fn env_bool(key: &str) -> bool {
    matches!(
        env::var(key).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bool_accepts_common_truthy_values() {
        // Keys unique to this test to stay clear of parallel tests.
        env::set_var("WATCHBOOT_TEST_BOOL_A", "1");
        env::set_var("WATCHBOOT_TEST_BOOL_B", "no");
        assert!(env_bool("WATCHBOOT_TEST_BOOL_A"));
        assert!(!env_bool("WATCHBOOT_TEST_BOOL_B"));
        assert!(!env_bool("WATCHBOOT_TEST_BOOL_UNSET"));
    }
}
