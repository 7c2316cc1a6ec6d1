//! Plan command implementation.

use crate::cli::PlanArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use chrono::Utc;
use tidemark_rotator::Rotator;

/// Execute the plan command.
///
/// Scans and classifies the snapshot directory without deleting anything.
pub async fn execute_plan(
    args: PlanArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let rotator = Rotator::new(config.rotation.clone())?;
    let now = args.at.unwrap_or_else(Utc::now);

    let classification = rotator.plan(now)?;
    println!("{}", formatter.format_plan(&classification)?);

    Ok(())
}
