pub mod config;
pub mod config_map;
pub mod observability;

pub use config::{LoggingConfig, RotationPolicy, Settings, DEFAULT_CONFIG_MAP_NAME};
pub use config_map::{ConfigMap, EXAMPLE_KEY};
pub use observability::{
    parse_bool, ObservabilityConfig, ObservabilityKey, DEFAULT_LOG_URL_TEMPLATE,
    DEFAULT_REQUEST_METRICS_BACKEND, REQUEST_LOG_TEMPLATE_NAME,
};
