//! Exporter seam
//!
//! The component that actually produces a snapshot (a database dump tool, a
//! copy job) lives outside the rotation core. The [`Rotator`](crate::Rotator)
//! only asks it to write one file at a given path.

use crate::ExportError;
use std::future::Future;
use std::path::Path;

/// Produces a new snapshot file
///
/// Implementations write the snapshot to `target`, a path inside the
/// snapshot directory whose name follows the configured naming convention.
/// The rotator bounds the call with its export timeout and drops the future
/// when it expires.
///
/// Return [`ExportError::Unavailable`] when the backend is not provisioned
/// yet; the cycle is then skipped without error. Any other failure should be
/// [`ExportError::Failed`].
pub trait Exporter {
    /// Write one snapshot to `target`
    fn export(&self, target: &Path) -> impl Future<Output = Result<(), ExportError>> + Send;
}

