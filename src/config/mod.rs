//! Configuration module
//!
//! Handles loading and managing configuration. Precedence, highest first:
//! command-line flags, `SCOPE_KOANS_*` environment variables, config file,
//! built-in defaults.

mod env;

pub use env::EnvConfig;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;
use crate::utils::logger::LogLevel;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./scope-koans.yaml",
    "./scope-koans.yml",
    "./.scope-koans.yaml",
    "~/.config/scope-koans/config.yaml",
];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Report format (table, json, json-pretty, csv, summary)
    pub format: String,

    /// Color codes in table output
    pub colorize: bool,

    /// Per-case timeout in milliseconds; none by default
    pub case_timeout_ms: Option<u64>,

    /// Cases to skip, by case name or `suite/case`
    pub skip: Vec<String>,

    /// Log level for this crate
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: "table".to_string(),
            colorize: true,
            case_timeout_ms: None,
            skip: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from the first standard location, or defaults if there is none
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(timeout) = env.timeout_ms {
            self.case_timeout_ms = Some(timeout);
        }
        if env.no_color == Some(true) {
            self.colorize = false;
        }
        if let Some(skip) = &env.skip {
            self.skip = skip.clone();
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        self
    }

    /// Reject values the runner cannot use
    pub fn validate(&self) -> Result<()> {
        if OutputFormat::from_str(&self.format).is_none() {
            bail!(
                "Unknown output format '{}' (expected one of: {})",
                self.format,
                OutputFormat::names().join(", ")
            );
        }
        if let Err(e) = self.log_level.parse::<LogLevel>() {
            bail!(e);
        }
        if self.case_timeout_ms == Some(0) {
            bail!("case_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.format).unwrap_or(OutputFormat::Table)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or_default()
    }

    pub fn case_timeout(&self) -> Option<Duration> {
        self.case_timeout_ms.map(Duration::from_millis)
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.format, "table");
        assert!(config.colorize);
        assert_eq!(config.case_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scope-koans.yaml");

        let config = AppConfig {
            format: "json".to_string(),
            case_timeout_ms: Some(500),
            skip: vec!["About Scope/global variables".to_string()],
            ..AppConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.case_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "colorize": false }"#).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert!(!loaded.colorize);
        assert_eq!(loaded.format, "table");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_format = AppConfig {
            format: "xml".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_format.validate().is_err());

        let zero_timeout = AppConfig {
            case_timeout_ms: Some(0),
            ..AppConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env = EnvConfig {
            format: Some("csv".to_string()),
            timeout_ms: Some(250),
            no_color: Some(true),
            ..EnvConfig::default()
        };
        let config = AppConfig::default().with_env(&env);
        assert_eq!(config.output_format(), OutputFormat::Csv);
        assert_eq!(config.case_timeout_ms, Some(250));
        assert!(!config.colorize);
        assert!(config.skip.is_empty());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./a.yaml"), PathBuf::from("./a.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.yaml"), home.join("x.yaml"));
        }
    }
}
