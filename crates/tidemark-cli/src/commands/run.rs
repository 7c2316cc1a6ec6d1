//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::exporter::CommandExporter;
use crate::output::Formatter;
use chrono::Utc;
use tidemark_rotator::{CycleOutcome, Rotator};

/// Execute the run command.
///
/// Exports a fresh snapshot through the configured command, then rotates.
/// With `--skip-export` only the rotation runs.
pub async fn execute_run(
    args: RunArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match run_cycle(&args, config).await? {
        CycleOutcome::Completed(report) => {
            println!("{}", formatter.format_report(&report)?);
        }
        CycleOutcome::Skipped { reason } => {
            eprintln!("{}", formatter.info(&format!("Skipping backup: {}", reason)));
        }
    }

    Ok(())
}

/// Run one cycle with the command-line adjustments applied.
pub async fn run_cycle(args: &RunArgs, config: &Config) -> Result<CycleOutcome> {
    let mut rotation = config.rotation.clone();
    if args.dry_run {
        rotation.dry_run = true;
    }
    if let Some(secs) = args.export_timeout {
        rotation.export_timeout_secs = secs;
    }

    let rotator = Rotator::new(rotation)?;

    if args.skip_export {
        let report = rotator.rotate(Utc::now())?;
        return Ok(CycleOutcome::Completed(report));
    }

    let exporter = CommandExporter::from_settings(&config.export);
    Ok(rotator.run_cycle(&exporter).await?)
}
