//! Simulation configuration loading.
//!
//! TOML-backed configuration for the readers-writers simulation: task
//! counts, RNG seed, jitter bounds, and logging verbosity. Loading and
//! validation are split so callers can also build a config in code (CLI
//! overrides) and validate the result.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on the number of tasks per role. Keeps a typo in a config
/// file from fork-bombing the host with threads.
pub const MAX_TASKS_PER_ROLE: usize = 1024;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// The equivalent `tracing` filter directive.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Simulation parameters.
///
/// # TOML Example
///
/// ```toml
/// writers = 3
/// readers = 10
/// seed = 1
/// jitter_min_ms = 1000
/// jitter_max_ms = 2000
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of writer tasks to spawn.
    #[serde(default = "default_writers")]
    pub writers: usize,

    /// Number of reader tasks to spawn.
    #[serde(default = "default_readers")]
    pub readers: usize,

    /// Base RNG seed for jitter and writer payloads. Runs with the same
    /// seed and task counts draw identical random sequences.
    #[serde(default)]
    pub seed: u64,

    /// Lower bound of the per-task arrival jitter, in milliseconds.
    #[serde(default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,

    /// Upper bound of the per-task arrival jitter, in milliseconds.
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_writers() -> usize {
    3
}

fn default_readers() -> usize {
    10
}

fn default_jitter_min_ms() -> u64 {
    1000
}

fn default_jitter_max_ms() -> u64 {
    2000
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            writers: default_writers(),
            readers: default_readers(),
            seed: 0,
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            log_level: LogLevel::default(),
        }
    }
}

impl SimConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - no tasks would be spawned at all
    /// - either task count exceeds [`MAX_TASKS_PER_ROLE`]
    /// - the jitter bounds are inverted
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.writers == 0 && self.readers == 0 {
            return Err(ConfigError::ValidationError(
                "at least one reader or writer is required".to_string(),
            ));
        }
        if self.writers > MAX_TASKS_PER_ROLE || self.readers > MAX_TASKS_PER_ROLE {
            return Err(ConfigError::ValidationError(format!(
                "task counts are capped at {MAX_TASKS_PER_ROLE} per role"
            )));
        }
        if self.jitter_min_ms > self.jitter_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "jitter_min_ms ({}) exceeds jitter_max_ms ({})",
                self.jitter_min_ms, self.jitter_max_ms
            )));
        }
        Ok(())
    }

    /// The configured jitter bounds as durations.
    pub fn jitter_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.jitter_min_ms),
            Duration::from_millis(self.jitter_max_ms),
        )
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation so any serde-deserializable struct can be loaded.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = SimConfig::default();
        assert_eq!(config.writers, 3);
        assert_eq!(config.readers, 10);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "writers = 2\nreaders = 5\nseed = 42\njitter_min_ms = 0\njitter_max_ms = 10\nlog_level = \"debug\""
        )
        .unwrap();

        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.writers, 2);
        assert_eq!(config.readers, 5);
        assert_eq!(config.seed, 42);
        assert_eq!(config.jitter_bounds().1, Duration::from_millis(10));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "writers = 1").unwrap();

        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.writers, 1);
        assert_eq!(config.readers, 10);
        assert_eq!(config.jitter_min_ms, 1000);
    }

    #[test]
    fn test_missing_file() {
        let result = SimConfig::load(Path::new("/nonexistent/sim.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "writers = \"three\"").unwrap();

        let result = SimConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_rejects_empty_run() {
        let config = SimConfig {
            writers: 0,
            readers: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_jitter() {
        let config = SimConfig {
            jitter_min_ms: 100,
            jitter_max_ms: 10,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_huge_task_counts() {
        let config = SimConfig {
            readers: MAX_TASKS_PER_ROLE + 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
