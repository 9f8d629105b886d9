//! Command line definition

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command line interface for sopgate
#[derive(Parser, Debug)]
#[command(name = "sopgate")]
#[command(about = "sopgate - compliance checks, scoring gate and self-correction for service code")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (defaults to ./sopgate.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); `SOPGATE_LOG` takes precedence
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate sources and evaluate the gate
    Check(CheckArgs),
    /// Apply deterministic fixes, then validate the result
    Fix(FixArgs),
    /// List the rule catalog
    Rules(RulesArgs),
}

/// Which rules to run
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Category id (repeatable)
    #[arg(long = "category", value_name = "ID")]
    pub categories: Vec<String>,

    /// Rule id (repeatable)
    #[arg(long = "rule", value_name = "ID")]
    pub rules: Vec<String>,

    /// SOP name (repeatable)
    #[arg(long = "sop", value_name = "NAME")]
    pub sops: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to scan
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Gating profile (default, strict)
    #[arg(long)]
    pub profile: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FixArgs {
    #[command(flatten)]
    pub check: CheckArgs,

    /// Write corrected content back to disk
    #[arg(long)]
    pub write: bool,

    /// Maximum correction iterations per file
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Rule id never fixed (repeatable)
    #[arg(long = "skip-rule", value_name = "ID")]
    pub skip_rules: Vec<String>,

    /// Restrict fixing to these rule ids (repeatable)
    #[arg(long = "only-rule", value_name = "ID")]
    pub only_rules: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Only list this category
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum, default_value_t = ListFormat::Human)]
    pub format: ListFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Ci,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Human,
    Json,
}
