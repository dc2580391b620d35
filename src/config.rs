// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the evolution engine.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (QUBITOS_LINDBLAD_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::expm::{DEFAULT_PADE_ORDER, DEFAULT_PARALLEL_THRESHOLD, MAX_PADE_ORDER, MIN_PADE_ORDER};
use crate::lindblad::Strategy;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Matrix exponential settings
    #[serde(default)]
    pub pade: PadeConfig,

    /// Time-stepping settings
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let mut found = Config::default();
                // Try default locations
                for path in &["config.yaml", "config.yml", "/etc/qubitos/lindblad.yaml"] {
                    let path = Path::new(path);
                    if path.exists() {
                        found = Self::from_file(path)?;
                        break;
                    }
                }
                found
            }
        };

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load a YAML file without environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_PADE_ORDER") {
            if let Ok(order) = val.parse() {
                self.pade.order = order;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_MULTITHREADING") {
            self.pade.multithreading = parse_flag(&val);
        }
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.pade.parallel_threshold = threshold;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_STRATEGY") {
            if let Ok(strategy) = val.parse() {
                self.evolution.strategy = strategy;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_MAX_DT") {
            if let Ok(max_dt) = val.parse() {
                self.evolution.max_dt = max_dt;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LINDBLAD_LOG_FORMAT") {
            self.logging.format = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PADE_ORDER..=MAX_PADE_ORDER).contains(&self.pade.order) {
            return Err(Error::InvalidPadeOrder(self.pade.order));
        }
        if self.pade.parallel_threshold == 0 {
            return Err(Error::Config(
                "pade.parallel_threshold must be at least 1".to_string(),
            ));
        }
        if !(self.evolution.max_dt.is_finite() && self.evolution.max_dt > 0.0) {
            return Err(Error::Config(format!(
                "evolution.max_dt must be a positive finite number, got {}",
                self.evolution.max_dt
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        if self.pade.order > 13 {
            tracing::warn!(
                order = self.pade.order,
                "Padé orders above 13 reuse the order-13 scaling threshold"
            );
        }
        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

/// Matrix exponential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadeConfig {
    /// Padé approximant order (3..=20)
    #[serde(default = "default_pade_order")]
    pub order: u32,

    /// Parallelize dense products for large dimensions
    #[serde(default = "default_true")]
    pub multithreading: bool,

    /// Dimension above which products run in parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for PadeConfig {
    fn default() -> Self {
        Self {
            order: default_pade_order(),
            multithreading: true,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_pade_order() -> u32 {
    DEFAULT_PADE_ORDER
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

fn default_true() -> bool {
    true
}

/// Time-stepping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Integration strategy (euler, split)
    #[serde(default)]
    pub strategy: Strategy,

    /// Largest Euler substep
    #[serde(default = "default_max_dt")]
    pub max_dt: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_dt: default_max_dt(),
        }
    }
}

fn default_max_dt() -> f64 {
    0.01
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pade.order, 13);
        assert!(config.pade.multithreading);
        assert_eq!(config.pade.parallel_threshold, 256);
        assert_eq!(config.evolution.strategy, Strategy::Euler);
        assert_eq!(config.evolution.max_dt, 0.01);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut bad_config = Config::default();
        bad_config.pade.order = 2;
        assert!(matches!(
            bad_config.validate(),
            Err(Error::InvalidPadeOrder(2))
        ));
    }

    #[test]
    fn test_validate_max_dt() {
        let mut config = Config::default();
        config.evolution.max_dt = 0.0;
        let msg = format!("{}", config.validate().unwrap_err());
        assert!(msg.contains("max_dt"));

        config.evolution.max_dt = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_parallel_threshold() {
        let mut config = Config::default();
        config.pade.parallel_threshold = 0;
        let msg = format!("{}", config.validate().unwrap_err());
        assert!(msg.contains("parallel_threshold"));
    }

    #[test]
    fn test_validate_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        let msg = format!("{}", config.validate().unwrap_err());
        assert!(msg.contains("logging.format"));
    }

    #[test]
    fn test_high_pade_order_is_valid() {
        let mut config = Config::default();
        config.pade.order = 20;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
pade:
  order: 9
  multithreading: false
evolution:
  strategy: split
  max_dt: 0.001
"#
        )
        .unwrap();

        let config = Config::from_file(f.path()).unwrap();
        assert_eq!(config.pade.order, 9);
        assert!(!config.pade.multithreading);
        assert_eq!(config.pade.parallel_threshold, 256);
        assert_eq!(config.evolution.strategy, Strategy::Split);
        assert_eq!(config.evolution.max_dt, 0.001);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        // When a path is provided but doesn't exist, load returns defaults
        let path = std::path::Path::new("/tmp/does_not_exist_qubitos_lindblad_test.yaml");
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.pade.parallel_threshold, 256);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();

        let result = Config::load(Some(f.path()));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_config_rejects_unknown_strategy() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "evolution:\n  strategy: rk4").unwrap();
        assert!(Config::from_file(f.path()).is_err());
    }

    #[test]
    fn test_env_override_pade_order() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LINDBLAD_PADE_ORDER", "7");
        config.apply_env_overrides();
        assert_eq!(config.pade.order, 7);
        std::env::remove_var("QUBITOS_LINDBLAD_PADE_ORDER");
    }

    #[test]
    fn test_env_override_multithreading() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LINDBLAD_MULTITHREADING", "false");
        config.apply_env_overrides();
        assert!(!config.pade.multithreading);
        std::env::remove_var("QUBITOS_LINDBLAD_MULTITHREADING");

        // Also test "1" → true
        std::env::set_var("QUBITOS_LINDBLAD_MULTITHREADING", "1");
        config.apply_env_overrides();
        assert!(config.pade.multithreading);
        std::env::remove_var("QUBITOS_LINDBLAD_MULTITHREADING");
    }

    #[test]
    fn test_env_override_parallel_threshold() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LINDBLAD_PARALLEL_THRESHOLD", "64");
        config.apply_env_overrides();
        assert_eq!(config.pade.parallel_threshold, 64);
        std::env::remove_var("QUBITOS_LINDBLAD_PARALLEL_THRESHOLD");
    }

    #[test]
    fn test_env_override_strategy() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LINDBLAD_STRATEGY", "split");
        config.apply_env_overrides();
        assert_eq!(config.evolution.strategy, Strategy::Split);
        std::env::remove_var("QUBITOS_LINDBLAD_STRATEGY");
    }

    #[test]
    fn test_env_override_max_dt_ignores_garbage() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LINDBLAD_MAX_DT", "not-a-number");
        config.apply_env_overrides();
        assert_eq!(config.evolution.max_dt, 0.01);
        std::env::remove_var("QUBITOS_LINDBLAD_MAX_DT");
    }

    #[test]
    fn test_env_override_logging() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LINDBLAD_LOG_LEVEL", "debug");
        std::env::set_var("QUBITOS_LINDBLAD_LOG_FORMAT", "json");
        config.apply_env_overrides();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        std::env::remove_var("QUBITOS_LINDBLAD_LOG_LEVEL");
        std::env::remove_var("QUBITOS_LINDBLAD_LOG_FORMAT");
    }
}
