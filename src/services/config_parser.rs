use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::domain::error::ConfigError;
use crate::domain::models::{
    parse_bool, ConfigMap, ObservabilityConfig, ObservabilityKey, EXAMPLE_KEY,
    REQUEST_LOG_TEMPLATE_NAME,
};
use crate::services::template;

/// Turns ConfigMap data into an [`ObservabilityConfig`].
///
/// Parsing is pure: the result depends only on the supplied data, and a
/// failure never yields a partially populated config.
pub struct ConfigParser;

impl ConfigParser {
    /// Parse observability settings from ConfigMap data.
    ///
    /// Absent data is treated as empty. Unrecognised keys are ignored.
    /// Booleans are checked in key order; the request log template, when
    /// non-empty, is syntax-checked last.
    #[instrument(skip_all, fields(keys = data.map_or(0, BTreeMap::len)))]
    pub fn parse(
        data: Option<&BTreeMap<String, String>>,
    ) -> Result<ObservabilityConfig, ConfigError> {
        let mut config = ObservabilityConfig::default();
        let Some(data) = data else {
            debug!("no data, using defaults");
            return Ok(config);
        };

        for key in data.keys() {
            if key != EXAMPLE_KEY && ObservabilityKey::from_key(key).is_none() {
                debug!(key = %key, "ignoring unrecognized key");
            }
        }

        for key in ObservabilityKey::ALL {
            let Some(raw) = data.get(key.as_str()) else {
                continue;
            };
            match key {
                ObservabilityKey::EnableVarLogCollection => {
                    config.enable_var_log_collection = as_bool(key, raw)?;
                }
                ObservabilityKey::RevisionUrlTemplate => {
                    config.logging_url_template.clone_from(raw);
                }
                ObservabilityKey::RequestLogTemplate => {
                    config.request_log_template.clone_from(raw);
                }
                ObservabilityKey::EnableRequestLog => {
                    config.enable_request_log = as_bool(key, raw)?;
                }
                ObservabilityKey::EnableProbeRequestLog => {
                    config.enable_probe_request_log = as_bool(key, raw)?;
                }
                ObservabilityKey::RequestMetricsBackend => {
                    config.request_metrics_backend.clone_from(raw);
                }
                ObservabilityKey::EnableProfiling => {
                    config.enable_profiling = as_bool(key, raw)?;
                }
            }
        }

        if !config.request_log_template.is_empty() {
            template::parse(REQUEST_LOG_TEMPLATE_NAME, &config.request_log_template).map_err(
                |source| ConfigError::InvalidTemplateSyntax {
                    key: ObservabilityKey::RequestLogTemplate,
                    source,
                },
            )?;
        }

        debug!(?config, "parsed observability config");
        Ok(config)
    }

    /// Parse the data of `config_map`.
    #[instrument(skip_all, fields(namespace = %config_map.namespace, name = %config_map.name))]
    pub fn parse_config_map(config_map: &ConfigMap) -> Result<ObservabilityConfig, ConfigError> {
        Self::parse(Some(&config_map.data))
    }
}

fn as_bool(key: ObservabilityKey, raw: &str) -> Result<bool, ConfigError> {
    parse_bool(raw).ok_or_else(|| ConfigError::InvalidBooleanValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DEFAULT_LOG_URL_TEMPLATE;

    fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_absent_and_empty_data_yield_defaults() {
        assert_eq!(ConfigParser::parse(None).unwrap(), ObservabilityConfig::default());
        assert_eq!(
            ConfigParser::parse(Some(&BTreeMap::new())).unwrap(),
            ObservabilityConfig::default()
        );
    }

    #[test]
    fn test_all_inputs() {
        let input = data(&[
            ("logging.enable-var-log-collection", "true"),
            ("logging.revision-url-template", "https://logging.io"),
            ("logging.enable-probe-request-log", "true"),
            ("logging.write-request-logs", "true"),
            (
                "logging.request-log-template",
                r#"{"requestMethod": "{{.Request.Method}}"}"#,
            ),
            ("metrics.request-metrics-backend-destination", "stackdriver"),
            ("profiling.enable", "1"),
        ]);

        let config = ConfigParser::parse(Some(&input)).unwrap();
        assert_eq!(
            config,
            ObservabilityConfig {
                logging_url_template: "https://logging.io".to_string(),
                enable_var_log_collection: true,
                request_log_template: r#"{"requestMethod": "{{.Request.Method}}"}"#.to_string(),
                enable_request_log: true,
                enable_probe_request_log: true,
                request_metrics_backend: "stackdriver".to_string(),
                enable_profiling: true,
            }
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let input = data(&[
            ("metrics.backend-destination", "prometheus"),
            ("_example", "# nothing"),
        ]);
        let config = ConfigParser::parse(Some(&input)).unwrap();
        assert_eq!(config, ObservabilityConfig::default());
        assert_eq!(config.logging_url_template, DEFAULT_LOG_URL_TEMPLATE);
    }

    #[test]
    fn test_invalid_boolean() {
        let input = data(&[("logging.write-request-logs", "yes")]);
        let err = ConfigParser::parse(Some(&input)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidBooleanValue {
                key: ObservabilityKey::EnableRequestLog,
                value: "yes".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            r#"failed to parse "logging.write-request-logs": invalid boolean value "yes""#
        );
    }

    #[test]
    fn test_invalid_template() {
        let input = data(&[("logging.request-log-template", "{{ something }}")]);
        let err = ConfigParser::parse(Some(&input)).unwrap_err();
        assert_eq!(err.key(), ObservabilityKey::RequestLogTemplate);
        assert!(matches!(err, ConfigError::InvalidTemplateSyntax { .. }));
        assert_eq!(
            err.to_string(),
            r#"invalid "logging.request-log-template": template: requestLog:1: function "something" not defined"#
        );
    }

    #[test]
    fn test_template_number_out_of_range() {
        let input = data(&[("logging.request-log-template", "{{ printf \"%d\" 08 }}")]);
        let err = ConfigParser::parse(Some(&input)).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"invalid "logging.request-log-template": template: requestLog:1: integer overflow: "08""#
        );

        let input = data(&[("logging.request-log-template", "{{ 1e400 }}")]);
        assert!(matches!(
            ConfigParser::parse(Some(&input)),
            Err(ConfigError::InvalidTemplateSyntax { .. })
        ));
    }

    #[test]
    fn test_boolean_error_reported_before_template_error() {
        let input = data(&[
            ("logging.request-log-template", "{{ something }}"),
            ("profiling.enable", "maybe"),
        ]);
        let err = ConfigParser::parse(Some(&input)).unwrap_err();
        assert_eq!(err.key(), ObservabilityKey::EnableProfiling);
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let input = data(&[("metrics.request-metrics-backend-destination", " opencensus ")]);
        let config = ConfigParser::parse(Some(&input)).unwrap();
        assert_eq!(config.request_metrics_backend, " opencensus ");

        let input = data(&[("logging.enable-var-log-collection", " true")]);
        assert!(ConfigParser::parse(Some(&input)).is_err());
    }

    #[test]
    fn test_parse_config_map() {
        let cm = ConfigMap::new("config-observability", "knative-serving")
            .with_data([("logging.enable-probe-request-log", "True")]);
        let config = ConfigParser::parse_config_map(&cm).unwrap();
        assert!(config.enable_probe_request_log);
    }
}
