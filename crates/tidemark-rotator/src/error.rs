//! Error types for rotation cycles

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a rotation cycle
///
/// Per-item prune failures are not errors; they are collected in the
/// [`RotationReport`](crate::RotationReport).
#[derive(Error, Debug)]
pub enum RotatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot inventory could not be read
    #[error("Scan of {} failed: {source}", path.display())]
    Scan {
        /// Directory or entry being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Exporter ran but did not produce a snapshot (includes timeouts)
    #[error("Export failed: {0}")]
    ExportFailed(String),
}

/// Outcome reported by an [`Exporter`](crate::Exporter) that did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Export backend is not provisioned yet; the cycle is skipped
    #[error("Exporter unavailable: {0}")]
    Unavailable(String),

    /// Export backend errored
    #[error("Export failed: {0}")]
    Failed(String),
}
