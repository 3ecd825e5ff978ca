//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SCOPE_KOANS";

/// Overrides read from `SCOPE_KOANS_*` variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Config file from SCOPE_KOANS_CONFIG
    pub config_file: Option<String>,
    /// Output format from SCOPE_KOANS_FORMAT
    pub format: Option<String>,
    /// Case timeout from SCOPE_KOANS_TIMEOUT_MS
    pub timeout_ms: Option<u64>,
    /// Disable color from SCOPE_KOANS_NO_COLOR
    pub no_color: Option<bool>,
    /// Comma-separated skip list from SCOPE_KOANS_SKIP
    pub skip: Option<Vec<String>>,
    /// Log level from SCOPE_KOANS_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` for the full variable name
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Self {
            config_file: get("CONFIG"),
            format: get("FORMAT"),
            timeout_ms: get("TIMEOUT_MS").and_then(|v| v.parse().ok()),
            no_color: get("NO_COLOR").map(|v| parse_bool(&v)),
            skip: get("SKIP").map(|v| split_list(&v)),
            log_level: get("LOG"),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Split a comma-separated list, dropping empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
