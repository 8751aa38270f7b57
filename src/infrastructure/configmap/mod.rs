//! ConfigMap manifests
//!
//! - YAML manifest loading
//! - `_example` extraction for documented defaults
//! - Example checksum verification

pub mod loader;

pub use crate::domain::models::EXAMPLE_KEY;
pub use loader::{
    config_maps_from_file, load_config_map, parse_config_map, split_example, ConfigMapError,
};

/// Annotation carrying [`checksum`] of the `_example` body
pub const EXAMPLE_CHECKSUM_ANNOTATION: &str = "knative.dev/example-checksum";

/// CRC-32 (IEEE) of `content` as eight lowercase hex digits.
pub fn checksum(content: &str) -> String {
    format!("{:08x}", crc32fast::hash(content.as_bytes()))
}
