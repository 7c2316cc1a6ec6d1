//! Snapshot module - one backup artifact in the snapshot directory

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::fmt;

/// Unique identifier for a snapshot: its file name
///
/// Names are produced by [`SnapshotNaming`](crate::SnapshotNaming) from the
/// creation instant with fixed-width fields, so lexicographic order is
/// creation order. Ordering on `SnapshotId` is plain string ordering and is
/// the tie-break used by the retention policy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Create a SnapshotId from a file name
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark_domain::SnapshotId;
    ///
    /// let id = SnapshotId::new("backup-2024-01-15T12-00-00.sql");
    /// assert_eq!(id.as_str(), "backup-2024-01-15T12-00-00.sql");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the file name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SnapshotId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SnapshotId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A snapshot as seen by one rotation cycle
///
/// `created_at` is the file's last-modification time, not anything parsed
/// from the name. All ages and day buckets derive from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// File name within the snapshot directory
    pub id: SnapshotId,

    /// Creation instant (filesystem mtime)
    pub created_at: DateTime<Utc>,

    /// Size on disk in bytes (reporting only)
    pub size: u64,
}

impl Snapshot {
    /// Create a new snapshot record
    pub fn new(id: impl Into<SnapshotId>, created_at: DateTime<Utc>, size: u64) -> Self {
        Self {
            id: id.into(),
            created_at,
            size,
        }
    }

    /// Age of the snapshot relative to `now`
    ///
    /// Negative when the mtime lies in the future (clock skew).
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.created_at)
    }

    /// UTC calendar date of creation, used for same-day dedup
    pub fn day_bucket(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}
