//! Configuration loading for the risk-adjust CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Thresholds file to install at start-up; built-in defaults when absent.
    #[serde(default)]
    pub thresholds_path: Option<PathBuf>,

    /// Class labels in class-index order, used when a command omits them.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_labels() -> Vec<String> {
    vec!["Low".to_string(), "High".to_string(), "Severe".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds_path: None,
            labels: default_labels(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level, falling back to WARN.
    pub fn tracing_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::WARN)
    }
}
