//! Implementation of the `obscfg check-template` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{action_success, output, CommandOutput};
use crate::domain::models::REQUEST_LOG_TEMPLATE_NAME;
use crate::services::template;

#[derive(Args, Debug)]
pub struct CheckTemplateArgs {
    /// Template source
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub template: Option<String>,

    /// Read the template source from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Template name used in error messages
    #[arg(long, default_value = REQUEST_LOG_TEMPLATE_NAME)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckTemplateOutput {
    pub name: String,
    pub valid: bool,
    pub lines: usize,
}

impl CommandOutput for CheckTemplateOutput {
    fn to_human(&self) -> String {
        action_success(&format!(
            "template {} is valid ({} line(s))",
            self.name, self.lines
        ))
    }
}

pub fn execute(args: CheckTemplateArgs, json_mode: bool) -> Result<()> {
    let source = match (args.template, &args.file) {
        (Some(source), _) => source,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("No template given"),
    };

    template::parse(&args.name, &source)?;
    output(
        &CheckTemplateOutput {
            name: args.name,
            valid: true,
            lines: source.lines().count(),
        },
        json_mode,
    );
    Ok(())
}
