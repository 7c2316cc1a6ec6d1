//! Results of a rotation cycle

use crate::pruner::{PruneFailure, PruneOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tidemark_domain::{Classification, DeleteReason, SnapshotId, Tier, Verdict};

/// What one rotation cycle decided and did
///
/// Tracks snapshots retained per tier, deletions by reason, and per-item
/// prune failures. Failures never make a cycle fail; they are surfaced here.
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    /// Evaluation instant shared by every decision
    pub evaluated_at: DateTime<Utc>,

    /// Whether deletions were only planned
    pub dry_run: bool,

    /// Snapshots found by the scan
    pub inventory: usize,

    /// Snapshots retained per tier
    pub retained: BTreeMap<Tier, usize>,

    /// Snapshots removed from disk
    pub deleted: Vec<SnapshotId>,

    /// Snapshots that would have been removed (dry run only)
    pub planned: Vec<SnapshotId>,

    /// Delete verdicts for snapshots past the daily window
    pub expired: usize,

    /// Delete verdicts for same-day duplicates
    pub superseded: usize,

    /// Deletions that failed
    pub failures: Vec<PruneFailure>,

    /// Bytes freed by successful deletions
    pub bytes_reclaimed: u64,

    /// Wall time of the cycle in milliseconds
    pub elapsed_ms: u64,
}

impl RotationReport {
    /// Create an empty report for one evaluation instant
    pub fn new(evaluated_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            evaluated_at,
            dry_run,
            inventory: 0,
            retained: BTreeMap::new(),
            deleted: Vec::new(),
            planned: Vec::new(),
            expired: 0,
            superseded: 0,
            failures: Vec::new(),
            bytes_reclaimed: 0,
            elapsed_ms: 0,
        }
    }

    /// Record the verdicts of a classification
    pub fn record_classification(&mut self, classification: &Classification) {
        self.inventory += classification.len();
        for decision in classification.decisions() {
            match &decision.verdict {
                Verdict::Retain => self.record_retained(decision.tier),
                Verdict::Delete(DeleteReason::Expired) => self.expired += 1,
                Verdict::Delete(DeleteReason::SupersededSameDay { .. }) => self.superseded += 1,
            }
        }
    }

    /// Record one retained snapshot
    pub fn record_retained(&mut self, tier: Tier) {
        *self.retained.entry(tier).or_insert(0) += 1;
    }

    /// Record the outcome of a prune pass
    pub fn record_prune(&mut self, outcome: PruneOutcome) {
        self.deleted.extend(outcome.removed);
        self.failures.extend(outcome.failed);
        self.bytes_reclaimed += outcome.bytes_reclaimed;
    }

    /// Record a deletion skipped because of dry-run mode
    pub fn record_planned(&mut self, id: SnapshotId) {
        self.planned.push(id);
    }

    /// Get total snapshots retained across all tiers
    pub fn total_retained(&self) -> usize {
        self.retained.values().sum()
    }

    /// Get total snapshots removed from disk
    pub fn total_deleted(&self) -> usize {
        self.deleted.len()
    }

    /// Whether any deletion failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Rotation Summary".to_string(),
            "================".to_string(),
            format!("Evaluated at: {}", self.evaluated_at.to_rfc3339()),
            format!("Snapshots scanned: {}", self.inventory),
            format!("Elapsed: {}ms", self.elapsed_ms),
            String::new(),
        ];

        lines.push(format!("Retained: {}", self.total_retained()));
        for (tier, count) in &self.retained {
            lines.push(format!("  {}: {}", tier, count));
        }

        if self.dry_run {
            lines.push(format!("Would delete (dry run): {}", self.planned.len()));
        } else {
            lines.push(format!("Deleted: {}", self.total_deleted()));
            lines.push(format!("Reclaimed: {} bytes", self.bytes_reclaimed));
        }
        lines.push(format!("  expired: {}", self.expired));
        lines.push(format!("  superseded: {}", self.superseded));

        if self.has_failures() {
            lines.push(String::new());
            lines.push(format!("Failures: {}", self.failures.len()));
            for failure in &self.failures {
                lines.push(format!("  {}: {}", failure.id, failure.reason));
            }
        }

        lines.join("\n")
    }
}
