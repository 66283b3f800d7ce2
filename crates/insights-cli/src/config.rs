//! Configuration for the insights CLI
//!
//! Loads configuration from:
//! 1. config.yaml - paths, analysis tunables, logging
//! 2. .env file - loaded into the environment before anything else
//!
//! Environment variables always override config.yaml values. A missing
//! config file is not an error: defaults plus environment are used.

use insights_pipeline::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

/// Raw sales export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("furniture_sales.csv"),
        }
    }
}

/// Where artifacts and their manifest are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub directory: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./artifacts"),
        }
    }
}

/// DuckDB table that receives the cleaned snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub table: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("furniture_sales.duckdb"),
            table: insights_duck::DEFAULT_TABLE.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub artifacts: ArtifactConfig,
    pub warehouse: WarehouseConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_yaml(&std::fs::read_to_string(path)?)?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Override values from `lookup`, normally the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("INSIGHTS_INPUT_PATH") {
            self.input.path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("INSIGHTS_ARTIFACT_DIR") {
            self.artifacts.directory = PathBuf::from(dir);
        }
        if let Some(path) = lookup("INSIGHTS_WAREHOUSE_PATH") {
            self.warehouse.path = PathBuf::from(path);
        }
        if let Some(table) = lookup("INSIGHTS_WAREHOUSE_TABLE") {
            self.warehouse.table = table;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(output) = lookup("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        if self.warehouse.enabled && self.warehouse.table.trim().is_empty() {
            return Err(ConfigError::InvalidValue("warehouse.table is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.path, PathBuf::from("furniture_sales.csv"));
        assert_eq!(config.artifacts.directory, PathBuf::from("./artifacts"));
        assert!(!config.warehouse.enabled);
        assert_eq!(config.warehouse.table, "furniture_sales");
        assert_eq!(config.analysis.listing_n, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "stdout");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
analysis:
  best_n: 3
  revenue_window:
    start: 2016-01-01
    end: 2016-06-30
warehouse:
  enabled: true
"#,
        )
        .unwrap();

        assert_eq!(config.analysis.best_n, 3);
        assert_eq!(config.analysis.listing_n, 10);
        assert_eq!(
            config.analysis.revenue_window.map(|w| w.end.to_string()),
            Some("2016-06-30".to_string())
        );
        assert!(config.warehouse.enabled);
        assert_eq!(config.warehouse.table, "furniture_sales");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_env_var_override() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("INSIGHTS_ARTIFACT_DIR", "/tmp/artifacts"),
            ("INSIGHTS_WAREHOUSE_TABLE", "sales_2017"),
            ("LOG_FORMAT", "json"),
        ]);

        let mut config = Config::from_yaml("logging:\n  format: compact\n").unwrap();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.artifacts.directory, PathBuf::from("/tmp/artifacts"));
        assert_eq!(config.warehouse.table, "sales_2017");
        assert_eq!(config.logging.format, "json"); // Overridden
        assert_eq!(config.input.path, PathBuf::from("furniture_sales.csv"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.analysis.region_top_n, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config::from_yaml("analysis:\n  listing_n: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let config = Config::from_yaml("warehouse:\n  enabled: true\n  table: ' '\n").unwrap();
        assert!(config.validate().is_err());
    }
}
