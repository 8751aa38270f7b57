//! Implementation of the `obscfg parse` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::warn;

use crate::cli::output::{config_table, output, CommandOutput};
use crate::domain::models::{ObservabilityConfig, Settings};
use crate::infrastructure::configmap::load_config_map;
use crate::services::ConfigParser;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// ConfigMap manifest to parse; defaults apply when omitted
    pub file: Option<PathBuf>,

    /// Data entry applied on top of the manifest (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
pub struct ParseOutput {
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub config: ObservabilityConfig,
}

impl CommandOutput for ParseOutput {
    fn to_human(&self) -> String {
        let title = match (&self.namespace, &self.name) {
            (Some(namespace), Some(name)) => format!("Observability config from {namespace}/{name}"),
            _ => "Observability config".to_string(),
        };
        format!("{title}\n{}", config_table(&self.config))
    }
}

pub fn execute(args: ParseArgs, settings: &Settings, json_mode: bool) -> Result<()> {
    let config_map = match &args.file {
        Some(path) => Some(
            load_config_map(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(cm) = &config_map {
        if !cm.is_identified_by(&settings.system_namespace, settings.config_map_name()) {
            warn!(
                namespace = %cm.namespace,
                name = %cm.name,
                expected_namespace = %settings.system_namespace,
                expected_name = %settings.config_map_name(),
                "ConfigMap is not the configured observability ConfigMap"
            );
        }
    }

    let mut data = config_map.as_ref().map(|cm| cm.data.clone());
    if !args.set.is_empty() {
        data.get_or_insert_with(BTreeMap::new).extend(args.set);
    }

    let config = ConfigParser::parse(data.as_ref())?;
    output(
        &ParseOutput {
            namespace: config_map.as_ref().map(|cm| cm.namespace.clone()),
            name: config_map.map(|cm| cm.name),
            config,
        },
        json_mode,
    );
    Ok(())
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))
}
