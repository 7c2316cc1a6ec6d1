//! CLI command definitions and argument parsing.

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tidemark - Tiered rotation for timestamped snapshot files.
#[derive(Debug, Parser)]
#[command(name = "tidemark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TIDEMARK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Snapshot directory
    #[arg(short, long, global = true, env = "TIDEMARK_SNAPSHOT_DIR")]
    pub dir: Option<PathBuf>,

    /// Retention preset; explicit window flags take precedence
    #[arg(long, value_enum, global = true, env = "TIDEMARK_PRESET")]
    pub preset: Option<Preset>,

    /// Hourly tier window in hours
    #[arg(long, global = true, env = "TIDEMARK_HOURLY_HOURS")]
    pub hourly_hours: Option<u64>,

    /// Daily tier window in days
    #[arg(long, global = true, env = "TIDEMARK_DAILY_DAYS")]
    pub daily_days: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (snapshot names only)
    Quiet,
}

/// Retention window presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// 24 hours hourly, 14 days daily
    Default,
    /// 12 hours hourly, 7 days daily
    Aggressive,
    /// 48 hours hourly, 30 days daily
    Lenient,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export a new snapshot and rotate the directory (default)
    Run(RunArgs),

    /// Show what a rotation would keep and delete
    Plan(PlanArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),
}

/// Arguments for a rotation run, accepted with or without `run`.
#[derive(Debug, Default, Clone, Args)]
pub struct RunArgs {
    /// Rotate only, without exporting a new snapshot
    #[arg(long, env = "TIDEMARK_SKIP_EXPORT")]
    pub skip_export: bool,

    /// Report deletions without removing anything
    #[arg(long, env = "TIDEMARK_DRY_RUN")]
    pub dry_run: bool,

    /// Export timeout in seconds
    #[arg(long, env = "TIDEMARK_EXPORT_TIMEOUT")]
    pub export_timeout: Option<u64>,
}

impl RunArgs {
    /// Combine flags given before and after the `run` word.
    pub fn merge(self, other: RunArgs) -> RunArgs {
        RunArgs {
            skip_export: self.skip_export || other.skip_export,
            dry_run: self.dry_run || other.dry_run,
            export_timeout: other.export_timeout.or(self.export_timeout),
        }
    }
}

/// Arguments for the plan command.
#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for configuration inspection.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the default configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
