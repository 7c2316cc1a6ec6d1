//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::TimeDelta;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tidemark_domain::{Classification, Tier, Verdict};
use tidemark_rotator::RotationReport;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the report of a rotation cycle.
    pub fn format_report(&self, report: &RotationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(format_report_quiet(report)),
        }
    }

    /// Format a classification without side effects.
    pub fn format_plan(&self, classification: &Classification) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_plan_json(classification),
            OutputFormat::Table => Ok(self.format_plan_table(classification)),
            OutputFormat::Quiet => Ok(format_plan_quiet(classification)),
        }
    }

    fn format_report_table(&self, report: &RotationReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        builder.push_record(["Evaluated at".to_string(), report.evaluated_at.to_rfc3339()]);
        builder.push_record(["Scanned".to_string(), report.inventory.to_string()]);
        for tier in Tier::ALL.into_iter().filter(Tier::is_retained) {
            let count = report.retained.get(&tier).copied().unwrap_or(0);
            builder.push_record([format!("Retained ({})", tier), count.to_string()]);
        }
        if report.dry_run {
            builder.push_record(["Would delete".to_string(), report.planned.len().to_string()]);
        } else {
            builder.push_record(["Deleted".to_string(), report.total_deleted().to_string()]);
            builder.push_record(["Reclaimed".to_string(), format_bytes(report.bytes_reclaimed)]);
        }
        builder.push_record(["Expired".to_string(), report.expired.to_string()]);
        builder.push_record(["Superseded".to_string(), report.superseded.to_string()]);
        builder.push_record(["Elapsed".to_string(), format!("{}ms", report.elapsed_ms)]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut output = table.to_string();
        if report.dry_run {
            output.push('\n');
            output.push_str(&self.info("Dry run: nothing was deleted"));
        }
        for failure in &report.failures {
            output.push('\n');
            output.push_str(&self.warning(&format!(
                "Could not delete {}: {}",
                failure.id, failure.reason
            )));
        }
        output
    }

    fn format_plan_json(&self, classification: &Classification) -> Result<String> {
        let decisions: Vec<serde_json::Value> = classification
            .decisions()
            .iter()
            .map(|d| {
                let reason = match &d.verdict {
                    Verdict::Retain => None,
                    Verdict::Delete(reason) => Some(reason.to_string()),
                };
                serde_json::json!({
                    "id": d.snapshot.id,
                    "created_at": d.snapshot.created_at,
                    "size": d.snapshot.size,
                    "age_seconds": d.age.num_seconds(),
                    "tier": d.tier,
                    "retain": d.verdict.is_retain(),
                    "reason": reason,
                })
            })
            .collect();

        let plan = serde_json::json!({
            "evaluated_at": classification.now,
            "decisions": decisions,
        });
        Ok(serde_json::to_string_pretty(&plan)?)
    }

    fn format_plan_table(&self, classification: &Classification) -> String {
        if classification.is_empty() {
            return self.colorize("No snapshots found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Created", "Age", "Tier", "Decision"]);

        for decision in classification.decisions() {
            let verdict = match &decision.verdict {
                Verdict::Retain => self.colorize("keep", "green"),
                Verdict::Delete(reason) => self.colorize(&format!("delete ({})", reason), "red"),
            };
            builder.push_record([
                decision.snapshot.id.to_string(),
                decision.snapshot.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                format_age(decision.age),
                decision.tier.to_string(),
                verdict,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let keep = classification.retained().count();
        let delete = classification.len() - keep;
        format!(
            "{}\n{}",
            table,
            self.info(&format!("{} to keep, {} to delete", keep, delete))
        )
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Deleted names, or planned ones in dry-run mode.
fn format_report_quiet(report: &RotationReport) -> String {
    let ids = if report.dry_run {
        &report.planned
    } else {
        &report.deleted
    };
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join("\n")
}

/// Names of snapshots the plan would delete.
fn format_plan_quiet(classification: &Classification) -> String {
    classification
        .deleted()
        .map(|d| d.snapshot.id.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an age as days, hours and minutes.
pub fn format_age(age: TimeDelta) -> String {
    if age < TimeDelta::zero() {
        return format!("in {}", format_age(-age));
    }

    let days = age.num_days();
    let hours = age.num_hours() % 24;
    let minutes = age.num_minutes() % 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Render a byte count with a binary unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
