//! Implementation of the `obscfg checksum` command.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cli::output::{action_failure, action_success, output, CommandOutput};
use crate::infrastructure::configmap::{
    checksum, load_config_map, EXAMPLE_CHECKSUM_ANNOTATION, EXAMPLE_KEY,
};

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// ConfigMap manifest carrying an `_example` block
    pub file: PathBuf,

    /// Rewrite a stale checksum annotation in place
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
pub struct ChecksumOutput {
    pub file: PathBuf,
    pub computed: String,
    pub annotated: Option<String>,
    pub up_to_date: bool,
    pub updated: bool,
}

impl CommandOutput for ChecksumOutput {
    fn to_human(&self) -> String {
        let file = self.file.display();
        if self.up_to_date {
            action_success(&format!("{file}: checksum {} is up to date", self.computed))
        } else if self.updated {
            action_success(&format!(
                "{file}: checksum updated to {} (was {})",
                self.computed,
                self.annotated.as_deref().unwrap_or("unset")
            ))
        } else {
            action_failure(&format!(
                "{file}: checksum annotation is {}, want {}",
                self.annotated.as_deref().unwrap_or("missing"),
                self.computed
            ))
        }
    }
}

pub fn execute(args: ChecksumArgs, json_mode: bool) -> Result<()> {
    let config_map = load_config_map(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let body = config_map
        .get(EXAMPLE_KEY)
        .with_context(|| format!("{} has no {EXAMPLE_KEY} key", args.file.display()))?;

    let computed = checksum(body);
    let annotated = config_map
        .annotations
        .get(EXAMPLE_CHECKSUM_ANNOTATION)
        .cloned();
    let up_to_date = annotated.as_deref() == Some(computed.as_str());

    let mut updated = false;
    if args.write && !up_to_date {
        let yaml = fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let rewritten = annotated
            .as_deref()
            .and_then(|stale| rewrite_annotation(&yaml, stale, &computed))
            .with_context(|| {
                format!(
                    "{} has no {EXAMPLE_CHECKSUM_ANNOTATION} annotation value to replace",
                    args.file.display()
                )
            })?;
        fs::write(&args.file, rewritten)
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        info!(file = %args.file.display(), checksum = %computed, "updated example checksum");
        updated = true;
    }

    let result = ChecksumOutput {
        file: args.file,
        computed,
        annotated,
        up_to_date,
        updated,
    };
    output(&result, json_mode);

    if !result.up_to_date && !result.updated {
        anyhow::bail!("Example checksum annotation is stale; rerun with --write");
    }
    Ok(())
}

/// Replace the checksum annotation value `stale` with `computed`.
///
/// Only the value after the annotation key on its own line is touched, so the
/// rest of the manifest keeps its formatting. Returns `None` when no such
/// line carries `stale`.
fn rewrite_annotation(yaml: &str, stale: &str, computed: &str) -> Option<String> {
    if stale.is_empty() {
        return None;
    }

    let mut found = false;
    let lines: Vec<String> = yaml
        .split_inclusive('\n')
        .map(|line| {
            if found {
                return line.to_string();
            }
            let Some(pos) = line.find(EXAMPLE_CHECKSUM_ANNOTATION) else {
                return line.to_string();
            };
            let (head, tail) = line.split_at(pos + EXAMPLE_CHECKSUM_ANNOTATION.len());
            if tail.contains(stale) {
                found = true;
                format!("{head}{}", tail.replacen(stale, computed, 1))
            } else {
                line.to_string()
            }
        })
        .collect();

    found.then(|| lines.concat())
}
