//! obscfg CLI entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use obscfg::cli::commands::{check_template, checksum, defaults, parse, verify};
use obscfg::cli::{handle_error, Cli, Commands};
use obscfg::infrastructure::config::SettingsLoader;
use obscfg::infrastructure::logging::{LogConfig, LoggerImpl};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            handle_error(&err, json_mode);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => SettingsLoader::load_from_file(path)?,
        None => SettingsLoader::load()?,
    };
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    let _logger = LoggerImpl::init(&LogConfig::from(&settings.logging))?;

    match cli.command {
        Commands::Parse(args) => parse::execute(args, &settings, cli.json),
        Commands::Verify(args) => verify::execute(args, cli.json),
        Commands::Defaults => defaults::execute(cli.json),
        Commands::Checksum(args) => checksum::execute(args, cli.json),
        Commands::CheckTemplate(args) => check_template::execute(args, cli.json),
    }
}
