use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::{checksum, EXAMPLE_CHECKSUM_ANNOTATION, EXAMPLE_KEY};
use crate::domain::models::ConfigMap;

/// ConfigMap manifest error types
#[derive(Error, Debug)]
pub enum ConfigMapError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Expected kind ConfigMap, found {0:?}")]
    NotAConfigMap(String),

    #[error("ConfigMap {name} has no {EXAMPLE_KEY} key")]
    MissingExample { name: String },

    #[error("ConfigMap {name} is missing the {EXAMPLE_CHECKSUM_ANNOTATION} annotation")]
    MissingChecksum { name: String },

    #[error(
        "ConfigMap {name}: example checksum annotation = {annotated}, want {computed} (regenerate the annotation)"
    )]
    ChecksumMismatch {
        name: String,
        annotated: String,
        computed: String,
    },

    #[error("ConfigMap {name} contains unexpected keys: {keys:?}")]
    UnexpectedKeys { name: String, keys: Vec<String> },

    #[error("ConfigMap {name} is missing expected keys: {keys:?}")]
    MissingKeys { name: String, keys: Vec<String> },

    #[error("ConfigMap {name} has an invalid {EXAMPLE_KEY} body: {source}")]
    ExampleYaml {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Kubernetes manifest shape of a ConfigMap
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    kind: String,
    metadata: Metadata,
    #[serde(default)]
    data: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
}

impl From<Manifest> for ConfigMap {
    fn from(manifest: Manifest) -> Self {
        Self {
            name: manifest.metadata.name,
            namespace: manifest.metadata.namespace,
            data: manifest.data.unwrap_or_default(),
            annotations: manifest.metadata.annotations,
        }
    }
}

/// Parse a ConfigMap from manifest YAML.
pub fn parse_config_map(yaml: &str) -> Result<ConfigMap, ConfigMapError> {
    let manifest: Manifest = serde_yaml::from_str(yaml)?;
    if manifest.kind != "ConfigMap" {
        return Err(ConfigMapError::NotAConfigMap(manifest.kind));
    }
    Ok(manifest.into())
}

/// Read a ConfigMap manifest from disk.
#[instrument(fields(path = %path.as_ref().display()), skip_all)]
pub fn load_config_map(path: impl AsRef<Path>) -> Result<ConfigMap, ConfigMapError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigMapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config_map = parse_config_map(&yaml)?;
    debug!(
        namespace = %config_map.namespace,
        name = %config_map.name,
        keys = config_map.data.len(),
        "loaded ConfigMap"
    );
    Ok(config_map)
}

/// Split a shipped ConfigMap into its actual form and its documented example.
///
/// The actual ConfigMap is returned unchanged. It may hold only the
/// `_example` key plus every key in `allowed`, and must carry a checksum
/// annotation matching the `_example` body. The example ConfigMap shares the
/// identity of the actual one; its data is the `_example` body read as YAML,
/// completed with any actual keys the body does not mention.
pub fn split_example(
    config_map: ConfigMap,
    allowed: &[&str],
) -> Result<(ConfigMap, ConfigMap), ConfigMapError> {
    let name = config_map.name.clone();
    let Some(body) = config_map.data.get(EXAMPLE_KEY) else {
        return Err(ConfigMapError::MissingExample { name });
    };

    let unexpected: Vec<String> = config_map
        .data
        .keys()
        .filter(|k| *k != EXAMPLE_KEY && !allowed.contains(&k.as_str()))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(ConfigMapError::UnexpectedKeys {
            name,
            keys: unexpected,
        });
    }
    let missing: Vec<String> = allowed
        .iter()
        .filter(|k| !config_map.data.contains_key(**k))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ConfigMapError::MissingKeys {
            name,
            keys: missing,
        });
    }

    let Some(annotated) = config_map.annotations.get(EXAMPLE_CHECKSUM_ANNOTATION) else {
        return Err(ConfigMapError::MissingChecksum { name });
    };
    let computed = checksum(body);
    if *annotated != computed {
        warn!(%name, %annotated, %computed, "example checksum is stale");
        return Err(ConfigMapError::ChecksumMismatch {
            name,
            annotated: annotated.clone(),
            computed,
        });
    }

    let mut example_data = parse_example_body(body)
        .map_err(|source| ConfigMapError::ExampleYaml {
            name: name.clone(),
            source,
        })?;
    for (key, value) in &config_map.data {
        if key != EXAMPLE_KEY {
            example_data
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    let example = ConfigMap {
        data: example_data,
        ..config_map.clone()
    };
    Ok((config_map, example))
}

/// Load a shipped ConfigMap manifest and split it with [`split_example`].
pub fn config_maps_from_file(
    path: impl AsRef<Path>,
    allowed: &[&str],
) -> Result<(ConfigMap, ConfigMap), ConfigMapError> {
    split_example(load_config_map(path)?, allowed)
}

fn parse_example_body(body: &str) -> Result<BTreeMap<String, String>, serde_yaml::Error> {
    let has_content = body.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !has_content {
        return Ok(BTreeMap::new());
    }
    let data: Option<BTreeMap<String, String>> = serde_yaml::from_str(body)?;
    Ok(data.unwrap_or_default())
}
