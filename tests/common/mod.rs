//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use obscfg::ConfigMap;
use tempfile::TempDir;

/// Path of the ConfigMap manifest shipped with the crate
pub fn shipped_config_map() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/config-observability.yaml")
}

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// ConfigMap data from key/value pairs
#[allow(dead_code)]
pub fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// The observability ConfigMap in its usual namespace, holding `pairs`
#[allow(dead_code)]
pub fn observability_config_map(pairs: &[(&str, &str)]) -> ConfigMap {
    ConfigMap::new("config-observability", "knative-serving").with_data(data(pairs))
}
