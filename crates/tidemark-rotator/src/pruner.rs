//! Deletion of classified snapshots

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tidemark_domain::{Decision, SnapshotId, Verdict};

/// A single deletion that did not happen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneFailure {
    /// Snapshot that could not be removed
    pub id: SnapshotId,
    /// Human-readable cause
    pub reason: String,
}

/// Result of one prune pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Snapshots removed from disk, in the order attempted
    pub removed: Vec<SnapshotId>,
    /// Snapshots that failed, with reasons
    pub failed: Vec<PruneFailure>,
    /// Sum of the sizes of removed snapshots
    pub bytes_reclaimed: u64,
}

/// Removes snapshot files from one directory
///
/// Every target is attempted; a failure on one never stops the rest.
#[derive(Debug, Clone)]
pub struct Pruner {
    dir: PathBuf,
}

impl Pruner {
    /// Create a pruner for `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Delete the snapshot behind each decision
    ///
    /// Decisions are taken as given; the caller decides which ones to pass.
    pub fn prune<'a, I>(&self, doomed: I) -> PruneOutcome
    where
        I: IntoIterator<Item = &'a Decision>,
    {
        let mut outcome = PruneOutcome::default();

        for decision in doomed {
            let id = &decision.snapshot.id;
            match self.remove(id) {
                Ok(()) => {
                    if let Verdict::Delete(reason) = &decision.verdict {
                        tracing::info!("Deleted {} ({})", id, reason);
                    } else {
                        tracing::info!("Deleted {}", id);
                    }
                    outcome.bytes_reclaimed += decision.snapshot.size;
                    outcome.removed.push(id.clone());
                }
                Err(reason) => {
                    tracing::warn!("Could not delete {}: {}", id, reason);
                    outcome.failed.push(PruneFailure {
                        id: id.clone(),
                        reason,
                    });
                }
            }
        }

        outcome
    }

    fn remove(&self, id: &SnapshotId) -> Result<(), String> {
        // Identifiers are bare file names; anything else could escape `dir`.
        let name = Path::new(id.as_str());
        if name.file_name() != Some(name.as_os_str()) {
            return Err("not a plain file name".to_string());
        }

        fs::remove_file(self.dir.join(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => "already removed".to_string(),
            ErrorKind::PermissionDenied => format!("permission denied: {}", e),
            _ => e.to_string(),
        })
    }
}
