//! Tidemark Rotator
//!
//! Tiered rotation of timestamped snapshot files in a single directory.
//!
//! # Overview
//!
//! A rotation cycle runs four steps against one evaluation instant:
//! - **Export** (optional): an injected [`Exporter`] writes a fresh snapshot
//! - **Scan**: the [`Scanner`] inventories files matching the naming convention
//! - **Classify**: the retention policy assigns each snapshot a tier and verdict
//! - **Prune**: the [`Pruner`] deletes the losers, tolerating per-file failures
//!
//! ## Retention Tiers
//!
//! | Tier | Age (default) | Kept |
//! |------|---------------|------|
//! | **Hourly** | ≤ 24 hours | Every snapshot |
//! | **Daily** | 24 hours to 14 days | First snapshot of each UTC day |
//! | **Expired** | > 14 days | None |
//!
//! # Usage
//!
//! ## Rotation Only
//!
//! ```no_run
//! use tidemark_rotator::{Rotator, RotatorConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rotator = Rotator::new(RotatorConfig::default())?;
//! let report = rotator.rotate(chrono::Utc::now())?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Full Cycle
//!
//! ```no_run
//! use std::path::Path;
//! use tidemark_rotator::{CycleOutcome, ExportError, Exporter, Rotator, RotatorConfig};
//!
//! struct CopyExporter;
//!
//! impl Exporter for CopyExporter {
//!     async fn export(&self, target: &Path) -> Result<(), ExportError> {
//!         tokio::fs::copy("app.db", target)
//!             .await
//!             .map(|_| ())
//!             .map_err(|e| ExportError::Failed(e.to_string()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rotator = Rotator::new(RotatorConfig::default())?;
//!     match rotator.run_cycle(&CopyExporter).await? {
//!         CycleOutcome::Completed(report) => println!("{}", report.summary()),
//!         CycleOutcome::Skipped { reason } => println!("skipped: {}", reason),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The Rotator can be configured via TOML:
//!
//! ```toml
//! snapshot_dir = "/var/backups/app"
//! hourly_window_hours = 24
//! daily_window_days = 14
//! prefix = "backup-"
//! extension = ".sql"
//! dry_run = false
//! export_timeout_secs = 300
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod export;
mod pruner;
mod report;
mod rotator;
mod scanner;

pub use config::RotatorConfig;
pub use error::{ExportError, RotatorError};
pub use export::Exporter;
pub use pruner::{PruneFailure, PruneOutcome, Pruner};
pub use report::RotationReport;
pub use rotator::{CycleOutcome, Rotator};
pub use scanner::Scanner;
