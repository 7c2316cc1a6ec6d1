//! Snapshot inventory

use crate::RotatorError;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tidemark_domain::{Snapshot, SnapshotNaming};

/// Reads a snapshot directory into an ordered inventory
///
/// Only regular files whose names match the [`SnapshotNaming`] convention are
/// inventoried. Everything else is skipped and logged at debug level.
#[derive(Debug, Clone)]
pub struct Scanner {
    dir: PathBuf,
    naming: SnapshotNaming,
}

impl Scanner {
    /// Create a scanner for `dir`
    pub fn new(dir: impl Into<PathBuf>, naming: SnapshotNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
        }
    }

    /// The directory being scanned
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the snapshot directory if it is missing
    ///
    /// Returns `true` when the directory was created by this call.
    pub fn ensure_dir(&self) -> Result<bool, RotatorError> {
        if self.dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.dir).map_err(|source| RotatorError::Scan {
            path: self.dir.clone(),
            source,
        })?;
        tracing::info!("Created snapshot directory {}", self.dir.display());
        Ok(true)
    }

    /// Inventory the directory, ordered by identifier
    ///
    /// A missing directory is created and yields an empty inventory. Entries
    /// that disappear between listing and stat (a concurrent prune) are
    /// skipped. Any other I/O failure is fatal.
    pub fn scan(&self) -> Result<Vec<Snapshot>, RotatorError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.ensure_dir()?;
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(RotatorError::Scan {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RotatorError::Scan {
                path: self.dir.clone(),
                source,
            })?;

            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!("Ignoring non UTF-8 entry {:?}", entry.file_name());
                continue;
            };
            if !self.naming.matches(&name) {
                tracing::debug!("Ignoring {} (does not match naming convention)", name);
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Skipping {} (removed during scan)", name);
                    continue;
                }
                Err(source) => {
                    return Err(RotatorError::Scan {
                        path: entry.path(),
                        source,
                    })
                }
            };
            if !metadata.is_file() {
                tracing::debug!("Ignoring {} (not a regular file)", name);
                continue;
            }

            let modified = metadata.modified().map_err(|source| RotatorError::Scan {
                path: entry.path(),
                source,
            })?;

            snapshots.push(Snapshot::new(
                name,
                DateTime::<Utc>::from(modified),
                metadata.len(),
            ));
        }

        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::debug!(
            "Scanned {}: {} snapshot(s)",
            self.dir.display(),
            snapshots.len()
        );
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs::File;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, modified: SystemTime) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_scan_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::new(tmp.path(), SnapshotNaming::default());
        assert!(scanner.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("backups");
        let scanner = Scanner::new(&dir, SnapshotNaming::default());

        assert!(scanner.scan().unwrap().is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_scan_filters_and_orders() {
        let tmp = TempDir::new().unwrap();
        let now = SystemTime::now();
        touch(tmp.path(), "backup-2024-01-13T20-00-00.sql", now);
        touch(tmp.path(), "backup-2024-01-13T08-00-00.sql", now);
        touch(tmp.path(), "README.md", now);
        touch(tmp.path(), "backup-2024-01-13T08-00-00.sql.partial", now);
        fs::create_dir(tmp.path().join("backup-archive.sql")).unwrap();

        let scanner = Scanner::new(tmp.path(), SnapshotNaming::default());
        let names: Vec<String> = scanner
            .scan()
            .unwrap()
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "backup-2024-01-13T08-00-00.sql".to_string(),
                "backup-2024-01-13T20-00-00.sql".to_string(),
            ]
        );
    }

    #[test]
    fn test_scan_uses_mtime_and_size() {
        let tmp = TempDir::new().unwrap();
        let mtime = Utc.with_ymd_and_hms(2024, 1, 13, 8, 0, 0).unwrap();
        let path = tmp.path().join("backup-2099-12-31T23-59-59.sql");
        fs::write(&path, b"CREATE TABLE t (id INTEGER);").unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime.into())
            .unwrap();

        let scanner = Scanner::new(tmp.path(), SnapshotNaming::default());
        let snapshots = scanner.scan().unwrap();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].created_at, mtime);
        assert_eq!(snapshots[0].size, 28);
    }

    #[test]
    fn test_scan_of_file_path_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("plain-file");
        fs::write(&not_a_dir, b"x").unwrap();

        let scanner = Scanner::new(&not_a_dir, SnapshotNaming::default());
        assert!(matches!(scanner.scan(), Err(RotatorError::Scan { .. })));
    }

    #[test]
    fn test_ensure_dir_reports_creation() {
        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::new(tmp.path().join("fresh"), SnapshotNaming::default());
        assert!(scanner.ensure_dir().unwrap());
        assert!(!scanner.ensure_dir().unwrap());
    }
}
