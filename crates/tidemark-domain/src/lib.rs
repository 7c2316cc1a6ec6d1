//! Tidemark Domain Layer
//!
//! Core value types and the retention policy for Tidemark. This crate does no
//! I/O: it knows nothing about directories, processes, or clocks. Everything
//! here is a pure function of its inputs so the policy can be tested without a
//! filesystem.
//!
//! ## Key Concepts
//!
//! - **Snapshot**: one backup file, identified by name, dated by its mtime
//! - **Tier**: retention bucket derived from age (hourly → daily → expired)
//! - **Day bucket**: UTC calendar date used to thin out the Daily tier
//! - **Naming**: the sortable, filesystem-safe file name convention
//! - **Classification**: keep/delete decisions for one evaluation instant

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod naming;
pub mod retention;
pub mod snapshot;
pub mod tier;

// Re-exports for convenience
pub use naming::SnapshotNaming;
pub use retention::{classify, Classification, Decision, DeleteReason, RetentionPolicy, Verdict};
pub use snapshot::{Snapshot, SnapshotId};
pub use tier::Tier;
