//! Naming module - the file name convention shared by exporter and scanner
//!
//! Snapshot names look like `backup-2024-01-15T12-00-00.sql`: the creation
//! instant in UTC at second resolution, with the `:` separators replaced so the
//! name is safe on every filesystem. Fixed-width fields keep lexicographic
//! order equal to creation order.

use chrono::{DateTime, Utc};

/// Timestamp layout embedded in snapshot names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Default file name prefix
pub const DEFAULT_PREFIX: &str = "backup-";

/// Default file name extension
pub const DEFAULT_EXTENSION: &str = ".sql";

/// File name convention for snapshots in one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNaming {
    /// Leading part of every snapshot name (may be empty)
    pub prefix: String,

    /// Trailing part of every snapshot name, including the dot
    pub extension: String,
}

impl Default for SnapshotNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl SnapshotNaming {
    /// Create a naming convention from a prefix and an extension
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Build the canonical file name for a snapshot created at `instant`
    ///
    /// Sub-second precision is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use tidemark_domain::SnapshotNaming;
    ///
    /// let naming = SnapshotNaming::default();
    /// let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    /// assert_eq!(naming.file_name_for(at), "backup-2024-01-15T12-00-00.sql");
    /// ```
    pub fn file_name_for(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            instant.format(TIMESTAMP_FORMAT),
            self.extension
        )
    }

    /// Whether a directory entry name belongs to this convention
    ///
    /// The name must carry the prefix and the extension with something in
    /// between. The middle part is not parsed.
    pub fn matches(&self, name: &str) -> bool {
        name.len() > self.prefix.len() + self.extension.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.extension)
    }
}
