use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process settings for the obscfg tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    /// Namespace the observability ConfigMap is expected in
    #[serde(default = "default_system_namespace")]
    pub system_namespace: String,

    /// Name of the observability ConfigMap
    #[serde(default = "default_config_observability_name")]
    pub config_observability_name: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_system_namespace() -> String {
    "knative-serving".to_string()
}

/// Name of the observability ConfigMap unless overridden.
pub const DEFAULT_CONFIG_MAP_NAME: &str = "config-observability";

fn default_config_observability_name() -> String {
    DEFAULT_CONFIG_MAP_NAME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_namespace: default_system_namespace(),
            config_observability_name: default_config_observability_name(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    pub fn config_map_name(&self) -> &str {
        &self.config_observability_name
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// How often the log file in `log_dir` rolls over
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}
