//! obscfg - Knative observability ConfigMap tooling
//!
//! Parses the `config-observability` ConfigMap into typed settings, checks
//! request log templates for Go template syntax errors, and verifies that a
//! shipped ConfigMap's documented `_example` block agrees with the defaults.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Configuration models and their errors
//! - **Service Layer** (`services`): ConfigMap data parsing
//! - **Infrastructure Layer** (`infrastructure`): Settings, manifests, logging, templates
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use obscfg::ConfigParser;
//!
//! let data = BTreeMap::from([(
//!     "logging.write-request-logs".to_string(),
//!     "true".to_string(),
//! )]);
//! let config = ConfigParser::parse(Some(&data)).unwrap();
//! assert!(config.enable_request_log);
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    ConfigMap, LoggingConfig, ObservabilityConfig, ObservabilityKey, Settings,
};
pub use domain::{ConfigError, TemplateError};
pub use infrastructure::config::{SettingsError, SettingsLoader};
pub use infrastructure::configmap::{config_maps_from_file, ConfigMapError};
pub use services::ConfigParser;
