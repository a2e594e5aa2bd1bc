//! Configuration management for the clash driver.
//!
//! This module handles loading, validation, and command-line overrides of
//! the driver configuration stored in a TOML file.

use crate::cli::CliArgs;
use clash_engine::ClashConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_threshold() -> f64 {
    0.0
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Clash threshold used when `--threshold` is not given
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Engine configuration
    #[serde(default)]
    pub engine: ClashConfig,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Output configuration settings
    #[serde(default)]
    pub output: OutputSettings,
}

/// Logging system configuration.
///
/// Controls log output format and level. Logs always go to stderr so they
/// never mix with results on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `results: N` followed by one distance per line
    #[default]
    Text,
    /// One `a<TAB>b<TAB>dist` line per result
    Pairs,
    /// The full result sequence as a JSON array
    Json,
}

/// Output configuration settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

impl LoggingSettings {
    /// Logging settings to install before the application is built.
    ///
    /// An unreadable or invalid configuration file falls back to the
    /// defaults here; the application reports the actual error once logging
    /// is up.
    pub fn for_startup(args: &CliArgs) -> Self {
        let mut config = AppConfig::load_from_file(&args.config_path).unwrap_or_default();
        config.apply_cli_overrides(args);
        config.logging
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults are returned instead.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            Ok(AppConfig::default())
        }
    }

    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(threshold) = args.threshold {
            self.threshold = threshold;
        }
        if let Some(convention) = args.convention {
            self.engine.convention = convention;
        }
        if let Some(index) = args.index {
            self.engine.index = index;
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
        if args.no_parallel {
            self.engine.parallel.enabled = false;
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() {
            return Err(format!("Invalid threshold: {}", self.threshold));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        self.engine.validate().map_err(|e| e.to_string())
    }
}
