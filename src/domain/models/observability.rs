use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Revision log URL used when `logging.revision-url-template` is absent.
///
/// `${REVISION_UID}` is substituted by the consumer of the template.
pub const DEFAULT_LOG_URL_TEMPLATE: &str = "http://localhost:8001/api/v1/namespaces/knative-monitoring/services/kibana-logging/proxy/app/kibana#/discover?_a=(query:(match:(kubernetes.labels.knative-dev%2FrevisionUID:(query:'${REVISION_UID}',type:phrase))))";

/// Metrics backend used when `metrics.request-metrics-backend-destination` is absent.
pub const DEFAULT_REQUEST_METRICS_BACKEND: &str = "prometheus";

/// Template name used when checking `logging.request-log-template`.
pub const REQUEST_LOG_TEMPLATE_NAME: &str = "requestLog";

/// Keys recognised in the observability ConfigMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservabilityKey {
    EnableVarLogCollection,
    RevisionUrlTemplate,
    RequestLogTemplate,
    EnableRequestLog,
    EnableProbeRequestLog,
    RequestMetricsBackend,
    EnableProfiling,
}

impl ObservabilityKey {
    /// Every recognised key, in parse order
    pub const ALL: [Self; 7] = [
        Self::EnableVarLogCollection,
        Self::RevisionUrlTemplate,
        Self::RequestLogTemplate,
        Self::EnableRequestLog,
        Self::EnableProbeRequestLog,
        Self::RequestMetricsBackend,
        Self::EnableProfiling,
    ];

    /// The ConfigMap data key
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnableVarLogCollection => "logging.enable-var-log-collection",
            Self::RevisionUrlTemplate => "logging.revision-url-template",
            Self::RequestLogTemplate => "logging.request-log-template",
            Self::EnableRequestLog => "logging.write-request-logs",
            Self::EnableProbeRequestLog => "logging.enable-probe-request-log",
            Self::RequestMetricsBackend => "metrics.request-metrics-backend-destination",
            Self::EnableProfiling => "profiling.enable",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for ObservabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observability settings for serving workloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObservabilityConfig {
    /// URL template for revision logs
    pub logging_url_template: String,

    /// Collect `/var/log` from user containers
    pub enable_var_log_collection: bool,

    /// Go template rendered for each request log line
    pub request_log_template: String,

    /// Write request logs
    pub enable_request_log: bool,

    /// Write request logs for probe requests too
    pub enable_probe_request_log: bool,

    /// Destination for request metrics
    pub request_metrics_backend: String,

    /// Serve profiling endpoints
    pub enable_profiling: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            logging_url_template: DEFAULT_LOG_URL_TEMPLATE.to_string(),
            enable_var_log_collection: false,
            request_log_template: String::new(),
            enable_request_log: false,
            enable_probe_request_log: false,
            request_metrics_backend: DEFAULT_REQUEST_METRICS_BACKEND.to_string(),
            enable_profiling: false,
        }
    }
}

impl ObservabilityConfig {
    /// Compare every field except `request_log_template`.
    ///
    /// The shipped example documents a request log template while the
    /// default ConfigMap leaves it unset.
    pub fn matches_ignoring_request_log_template(&self, other: &Self) -> bool {
        self.logging_url_template == other.logging_url_template
            && self.enable_var_log_collection == other.enable_var_log_collection
            && self.enable_request_log == other.enable_request_log
            && self.enable_probe_request_log == other.enable_probe_request_log
            && self.request_metrics_backend == other.request_metrics_backend
            && self.enable_profiling == other.enable_profiling
    }

    /// Render as ConfigMap data, one entry per recognised key.
    pub fn to_data(&self) -> BTreeMap<String, String> {
        ObservabilityKey::ALL
            .into_iter()
            .map(|key| (key.as_str().to_string(), self.value_of(key)))
            .collect()
    }

    /// The ConfigMap string form of the field behind `key`
    pub fn value_of(&self, key: ObservabilityKey) -> String {
        match key {
            ObservabilityKey::EnableVarLogCollection => self.enable_var_log_collection.to_string(),
            ObservabilityKey::RevisionUrlTemplate => self.logging_url_template.clone(),
            ObservabilityKey::RequestLogTemplate => self.request_log_template.clone(),
            ObservabilityKey::EnableRequestLog => self.enable_request_log.to_string(),
            ObservabilityKey::EnableProbeRequestLog => self.enable_probe_request_log.to_string(),
            ObservabilityKey::RequestMetricsBackend => self.request_metrics_backend.clone(),
            ObservabilityKey::EnableProfiling => self.enable_profiling.to_string(),
        }
    }
}

/// Parse a ConfigMap boolean.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything
/// else, including surrounding whitespace, is rejected.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
