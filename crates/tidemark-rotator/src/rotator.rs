//! Rotation cycle orchestration

use crate::{
    ExportError, Exporter, Pruner, RotationReport, RotatorConfig, RotatorError, Scanner,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tidemark_domain::{classify, Classification, RetentionPolicy, Verdict};

/// How a full cycle ended when it did not fail
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// A snapshot was exported and the directory rotated
    Completed(RotationReport),

    /// The exporter is not provisioned; nothing was touched
    Skipped {
        /// Why the exporter declined
        reason: String,
    },
}

/// Rotation engine for one snapshot directory
///
/// Runs Scanner → Classifier → Pruner against a single evaluation instant.
/// Holds no state between cycles: every decision is recomputed from the
/// directory and `now`.
///
/// Callers must not run two cycles on the same directory at once. If they do,
/// the second cycle's deletions of already-removed files show up as prune
/// failures.
///
/// # Examples
///
/// ```no_run
/// use tidemark_rotator::{Rotator, RotatorConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RotatorConfig::default().with_snapshot_dir("/var/backups/db");
/// let rotator = Rotator::new(config)?;
///
/// // Rotation only, no new snapshot
/// let report = rotator.rotate(chrono::Utc::now())?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Rotator {
    config: RotatorConfig,
    policy: RetentionPolicy,
    scanner: Scanner,
    pruner: Pruner,
}

impl Rotator {
    /// Create a new Rotator, validating the configuration
    pub fn new(config: RotatorConfig) -> Result<Self, RotatorError> {
        config.validate()?;
        let policy = config.policy()?;
        let scanner = Scanner::new(config.snapshot_dir.clone(), config.naming());
        let pruner = Pruner::new(config.snapshot_dir.clone());

        Ok(Self {
            config,
            policy,
            scanner,
            pruner,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &RotatorConfig {
        &self.config
    }

    /// Get the retention policy
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Scan and classify without deleting anything
    ///
    /// A missing snapshot directory is still created by the scan.
    pub fn plan(&self, now: DateTime<Utc>) -> Result<Classification, RotatorError> {
        let inventory = self.scanner.scan()?;
        Ok(classify(&inventory, now, &self.policy))
    }

    /// Run Scanner → Classifier → Pruner against `now`
    ///
    /// Fails only when the scan fails. Deletion failures are collected in the
    /// report. In dry-run mode the Delete set is reported as planned and
    /// nothing is removed.
    pub fn rotate(&self, now: DateTime<Utc>) -> Result<RotationReport, RotatorError> {
        let start = Instant::now();
        tracing::info!(
            "Running tiered rotation in {} (evaluated at {})",
            self.scanner.dir().display(),
            now.to_rfc3339()
        );

        let classification = self.plan(now)?;
        let mut report = RotationReport::new(now, self.config.dry_run);
        report.record_classification(&classification);

        if self.config.dry_run {
            for decision in classification.deleted() {
                if let Verdict::Delete(reason) = &decision.verdict {
                    tracing::info!("DRY RUN: Would delete {} ({})", decision.snapshot.id, reason);
                }
                report.record_planned(decision.snapshot.id.clone());
            }
        } else {
            let outcome = self.pruner.prune(classification.deleted());
            report.record_prune(outcome);
        }

        report.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if report.has_failures() {
            tracing::warn!(
                "Rotation completed with {} failed deletion(s): {} retained, {} deleted",
                report.failures.len(),
                report.total_retained(),
                report.total_deleted()
            );
        } else {
            tracing::info!(
                "Rotation completed: {} retained, {} deleted",
                report.total_retained(),
                report.total_deleted()
            );
        }

        Ok(report)
    }

    /// Export a fresh snapshot, then rotate
    ///
    /// The export is bounded by the configured timeout; expiry counts as a
    /// failed export. An unavailable exporter skips the cycle entirely.
    /// Rotation is evaluated at the instant the export finished.
    pub async fn run_cycle<E>(&self, exporter: &E) -> Result<CycleOutcome, RotatorError>
    where
        E: Exporter + Sync,
    {
        self.scanner.ensure_dir()?;

        let target = self
            .scanner
            .dir()
            .join(self.config.naming().file_name_for(Utc::now()));

        if let Some(reason) = self.export_to(exporter, &target).await? {
            return Ok(CycleOutcome::Skipped { reason });
        }

        self.rotate(Utc::now()).map(CycleOutcome::Completed)
    }

    /// Run the exporter against `target`
    ///
    /// Returns the skip reason when the exporter is unavailable. A target that
    /// already exists is never handed out, and whatever an unsuccessful export
    /// left at `target` is removed so it cannot be scanned as a snapshot.
    async fn export_to<E>(
        &self,
        exporter: &E,
        target: &Path,
    ) -> Result<Option<String>, RotatorError>
    where
        E: Exporter + Sync,
    {
        if fs::symlink_metadata(target).is_ok() {
            return Err(RotatorError::ExportFailed(format!(
                "{} already exists",
                target.display()
            )));
        }
        tracing::info!("Starting export to {}", target.display());

        let timeout = self.config.export_timeout();
        let result = match tokio::time::timeout(timeout, exporter.export(target)).await {
            Ok(result) => result,
            Err(_) => Err(ExportError::Failed(format!(
                "timed out after {}s",
                timeout.as_secs()
            ))),
        };

        match result {
            Ok(()) => {
                tracing::info!("Export completed: {}", target.display());
                Ok(None)
            }
            Err(ExportError::Unavailable(reason)) => {
                discard_partial(target);
                tracing::info!("Skipping cycle: exporter unavailable ({})", reason);
                Ok(Some(reason))
            }
            Err(ExportError::Failed(reason)) => {
                discard_partial(target);
                Err(RotatorError::ExportFailed(reason))
            }
        }
    }
}

/// Remove a partially written snapshot
fn discard_partial(target: &Path) {
    match fs::remove_file(target) {
        Ok(()) => tracing::info!("Removed partial export {}", target.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove partial export {}: {}",
            target.display(),
            e
        ),
    }
}
