//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::check_template::CheckTemplateArgs;
use super::commands::checksum::ChecksumArgs;
use super::commands::parse::ParseArgs;
use super::commands::verify::VerifyArgs;

#[derive(Parser, Debug)]
#[command(name = "obscfg")]
#[command(about = "Parse and validate Knative observability ConfigMaps", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Settings file (defaults to ./obscfg.yaml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a ConfigMap manifest into observability settings
    Parse(ParseArgs),

    /// Check that a ConfigMap's example block parses to the same settings as its data
    Verify(VerifyArgs),

    /// Show the default observability settings
    Defaults,

    /// Compute or refresh the example checksum annotation
    Checksum(ChecksumArgs),

    /// Check request log template syntax
    CheckTemplate(CheckTemplateArgs),
}
