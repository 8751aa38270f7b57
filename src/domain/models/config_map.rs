use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Data key holding the documented example configuration
pub const EXAMPLE_KEY: &str = "_example";

/// A named, namespaced key/value store of string configuration.
///
/// Identity (`name`, `namespace`) is only used to match against an expected
/// source; parsers consume `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMap {
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub data: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ConfigMap {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_data<K, V>(mut self, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.data
            .extend(data.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Whether this ConfigMap is the one identified by `namespace`/`name`.
    pub fn is_identified_by(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }
}
