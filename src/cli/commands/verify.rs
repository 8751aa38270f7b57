//! Implementation of the `obscfg verify` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{action_failure, action_success, list_table, output, CommandOutput};
use crate::domain::models::ObservabilityConfig;
use crate::infrastructure::configmap::{config_maps_from_file, EXAMPLE_CHECKSUM_ANNOTATION};
use crate::services::ConfigParser;

/// Field excluded from the example comparison
const IGNORED_FIELD: &str = "request_log_template";

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Shipped ConfigMap manifest carrying an `_example` block
    pub file: PathBuf,

    /// Data keys permitted next to `_example` (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub allow: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldDifference {
    pub field: String,
    pub actual: Value,
    pub example: Value,
}

#[derive(Debug, Serialize)]
pub struct VerifyOutput {
    pub namespace: String,
    pub name: String,
    pub checksum: String,
    pub matches: bool,
    pub differences: Vec<FieldDifference>,
}

impl CommandOutput for VerifyOutput {
    fn to_human(&self) -> String {
        let subject = format!("{}/{}", self.namespace, self.name);
        if self.matches {
            return action_success(&format!(
                "{subject}: example matches actual config (checksum {})",
                self.checksum
            ));
        }

        let mut table = list_table(&["field", "actual", "example"]);
        for diff in &self.differences {
            table.add_row(vec![
                diff.field.clone(),
                diff.actual.to_string(),
                diff.example.to_string(),
            ]);
        }
        format!(
            "{}\n{table}",
            action_failure(&format!("{subject}: example differs from actual config"))
        )
    }
}

pub fn execute(args: VerifyArgs, json_mode: bool) -> Result<()> {
    let allowed: Vec<&str> = args.allow.iter().map(String::as_str).collect();
    let (actual, example) = config_maps_from_file(&args.file, &allowed)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let actual_config =
        ConfigParser::parse_config_map(&actual).context("Actual ConfigMap is invalid")?;
    let example_config =
        ConfigParser::parse_config_map(&example).context("Example ConfigMap is invalid")?;

    let differences = differences(&actual_config, &example_config)?;
    let result = VerifyOutput {
        namespace: actual.namespace.clone(),
        name: actual.name.clone(),
        checksum: actual
            .annotations
            .get(EXAMPLE_CHECKSUM_ANNOTATION)
            .cloned()
            .unwrap_or_default(),
        matches: actual_config.matches_ignoring_request_log_template(&example_config),
        differences,
    };
    output(&result, json_mode);

    if !result.matches {
        anyhow::bail!(
            "Example in {} differs from the actual config in {} field(s)",
            args.file.display(),
            result.differences.len()
        );
    }
    Ok(())
}

/// Fields whose values differ, by serialized name.
pub fn differences(
    actual: &ObservabilityConfig,
    example: &ObservabilityConfig,
) -> Result<Vec<FieldDifference>> {
    let (Value::Object(actual), Value::Object(example)) =
        (serde_json::to_value(actual)?, serde_json::to_value(example)?)
    else {
        anyhow::bail!("Observability config did not serialize to an object");
    };

    Ok(actual
        .into_iter()
        .filter(|(field, _)| field != IGNORED_FIELD)
        .filter_map(|(field, actual)| {
            let example = example.get(&field)?.clone();
            (example != actual).then_some(FieldDifference {
                field,
                actual,
                example,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_differences_for_template_only_change() {
        let example = ObservabilityConfig {
            request_log_template: "{{.Request.Method}}".to_string(),
            ..Default::default()
        };
        let diffs = differences(&ObservabilityConfig::default(), &example).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_differences_reported_by_field() {
        let example = ObservabilityConfig {
            enable_profiling: true,
            request_metrics_backend: "opencensus".to_string(),
            ..Default::default()
        };
        let diffs = differences(&ObservabilityConfig::default(), &example).unwrap();
        let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"enable_profiling"));
        assert!(fields.contains(&"request_metrics_backend"));

        let backend = diffs
            .iter()
            .find(|d| d.field == "request_metrics_backend")
            .unwrap();
        assert_eq!(backend.actual, "prometheus");
        assert_eq!(backend.example, "opencensus");
    }

    #[test]
    fn test_human_output() {
        let ok = VerifyOutput {
            namespace: "knative-serving".to_string(),
            name: "config-observability".to_string(),
            checksum: "0123abcd".to_string(),
            matches: true,
            differences: vec![],
        };
        assert!(ok.to_human().contains("example matches actual config (checksum 0123abcd)"));

        let bad = VerifyOutput {
            matches: false,
            differences: vec![FieldDifference {
                field: "enable_profiling".to_string(),
                actual: Value::Bool(false),
                example: Value::Bool(true),
            }],
            ..ok
        };
        let human = bad.to_human();
        assert!(human.contains("example differs from actual config"));
        assert!(human.contains("enable_profiling"));
    }
}
