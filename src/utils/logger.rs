//! Logging setup
//!
//! Logs go to stderr so report output on stdout stays machine-readable.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Verbosity of this crate's own log lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "Unknown log level '{other}' (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter admitting this crate's events at `level`; dependencies stay quiet
pub fn filter_directive(level: LogLevel) -> String {
    format!("scope_koans={level}")
}

/// Install the stderr subscriber. A second call keeps the first one.
pub fn init_logger(level: LogLevel) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logger already initialised, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!("info".parse(), Ok(LogLevel::Info));
        assert_eq!(" WARNING ".parse(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().unwrap_err().contains("loud"));
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(LogLevel::Debug), "scope_koans=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logger(LogLevel::Warn);
        init_logger(LogLevel::Trace);
    }
}
