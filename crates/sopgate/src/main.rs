//! sopgate - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sopgate check [PATHS]` | Validate sources and evaluate the gate |
//! | `sopgate fix [PATHS] [--write]` | Apply deterministic fixes, then validate |
//! | `sopgate rules` | List the rule catalog |
//!
//! Exit codes: 0 gate passed, 1 gate failed, 2 configuration or runtime error.

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use sopgate_validate::{ConfigLoader, FileConfig};
use std::process::ExitCode;

/// Gate failed
const EXIT_GATE_FAILED: u8 = 1;
/// Configuration or runtime error
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_GATE_FAILED),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    logging::init_logging(&config.logging)?;

    match cli.command {
        Command::Check(args) => commands::check::run(config, &args),
        Command::Fix(args) => commands::fix::run(config, &args),
        Command::Rules(args) => commands::rules::run(&args).map(|()| true),
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json_logs {
        config.logging.json_format = true;
    }
    Ok(config)
}
