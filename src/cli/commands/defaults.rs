//! Implementation of the `obscfg defaults` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{config_table, output, CommandOutput};
use crate::domain::models::ObservabilityConfig;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct DefaultsOutput(pub ObservabilityConfig);

impl CommandOutput for DefaultsOutput {
    fn to_human(&self) -> String {
        format!("Default observability config\n{}", config_table(&self.0))
    }
}

pub fn execute(json_mode: bool) -> Result<()> {
    output(&DefaultsOutput(ObservabilityConfig::default()), json_mode);
    Ok(())
}
