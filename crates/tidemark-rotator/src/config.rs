//! Configuration for rotation cycles
//!
//! Defines the snapshot directory, tier windows, naming convention, and the
//! export timeout.

use crate::RotatorError;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tidemark_domain::naming::{DEFAULT_EXTENSION, DEFAULT_PREFIX};
use tidemark_domain::retention::{DEFAULT_DAILY_WINDOW_DAYS, DEFAULT_HOURLY_WINDOW_HOURS};
use tidemark_domain::{RetentionPolicy, SnapshotNaming};

/// Configuration for the Rotator
///
/// Passed by value into [`Rotator::new`](crate::Rotator::new); nothing here
/// is process-global.
///
/// # Examples
///
/// ```
/// use tidemark_rotator::RotatorConfig;
///
/// // Default configuration (24h hourly, 14d daily)
/// let config = RotatorConfig::default();
/// assert_eq!(config.hourly_window_hours, 24);
///
/// // Tighter retention
/// let config = RotatorConfig::aggressive();
/// assert_eq!(config.daily_window_days, 7);
///
/// // Longer retention
/// let config = RotatorConfig::lenient();
/// assert_eq!(config.daily_window_days, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatorConfig {
    /// Directory holding the snapshots
    /// Default: `backups` (relative to the working directory)
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Every snapshot younger than this is kept (in hours)
    /// Default: 24
    #[serde(default = "default_hourly_window_hours")]
    pub hourly_window_hours: u64,

    /// One snapshot per UTC day is kept up to this age (in days)
    /// Default: 14
    #[serde(default = "default_daily_window_days")]
    pub daily_window_days: u64,

    /// File name prefix of snapshots
    /// Default: `backup-`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// File name extension of snapshots, including the dot
    /// Default: `.sql`
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Dry-run mode: log what would be deleted without deleting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Upper bound on a single export call (in seconds)
    /// Default: 300
    #[serde(default = "default_export_timeout_secs")]
    pub export_timeout_secs: u64,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_hourly_window_hours() -> u64 {
    DEFAULT_HOURLY_WINDOW_HOURS as u64
}

fn default_daily_window_days() -> u64 {
    DEFAULT_DAILY_WINDOW_DAYS as u64
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_export_timeout_secs() -> u64 {
    300
}

impl Default for RotatorConfig {
    /// Balanced retention
    ///
    /// - Hourly: every snapshot from the last 24 hours
    /// - Daily: first snapshot of each day up to 14 days
    /// - Export timeout: 5 minutes
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            hourly_window_hours: default_hourly_window_hours(),
            daily_window_days: default_daily_window_days(),
            prefix: default_prefix(),
            extension: default_extension(),
            dry_run: false,
            export_timeout_secs: default_export_timeout_secs(),
        }
    }
}

impl RotatorConfig {
    /// Aggressive retention for tight disks
    ///
    /// - Hourly: 12 hours
    /// - Daily: 7 days
    pub fn aggressive() -> Self {
        Self {
            hourly_window_hours: 12,
            daily_window_days: 7,
            ..Self::default()
        }
    }

    /// Lenient retention for low-volume databases
    ///
    /// - Hourly: 48 hours
    /// - Daily: 30 days
    pub fn lenient() -> Self {
        Self {
            hourly_window_hours: 48,
            daily_window_days: 30,
            ..Self::default()
        }
    }

    /// Use a different snapshot directory
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Get export timeout as Duration
    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }

    /// Naming convention for this directory
    pub fn naming(&self) -> SnapshotNaming {
        SnapshotNaming::new(self.prefix.clone(), self.extension.clone())
    }

    /// Build the retention policy from the configured windows
    pub fn policy(&self) -> Result<RetentionPolicy, RotatorError> {
        let hourly = i64::try_from(self.hourly_window_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .ok_or_else(|| {
                RotatorError::Config(format!(
                    "hourly_window_hours out of range: {}",
                    self.hourly_window_hours
                ))
            })?;
        let daily = i64::try_from(self.daily_window_days)
            .ok()
            .and_then(TimeDelta::try_days)
            .ok_or_else(|| {
                RotatorError::Config(format!(
                    "daily_window_days out of range: {}",
                    self.daily_window_days
                ))
            })?;

        RetentionPolicy::new(hourly, daily).map_err(RotatorError::Config)
    }

    /// Check the whole configuration
    pub fn validate(&self) -> Result<(), RotatorError> {
        self.policy()?;

        if self.extension.is_empty() {
            return Err(RotatorError::Config("extension must not be empty".into()));
        }
        for (field, value) in [("prefix", &self.prefix), ("extension", &self.extension)] {
            if value.contains(['/', '\\']) {
                return Err(RotatorError::Config(format!(
                    "{} must not contain a path separator: {:?}",
                    field, value
                )));
            }
        }
        if self.export_timeout_secs == 0 {
            return Err(RotatorError::Config(
                "export_timeout_secs must be at least 1".into(),
            ));
        }
        if self.snapshot_dir.as_os_str().is_empty() {
            return Err(RotatorError::Config("snapshot_dir must not be empty".into()));
        }

        Ok(())
    }
}
