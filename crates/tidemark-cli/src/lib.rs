//! Tidemark CLI library.
//!
//! This library provides the core functionality for the `tidemark` command-line
//! interface, including configuration loading, the command-based snapshot
//! exporter, command execution, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exporter;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use exporter::CommandExporter;
pub use output::Formatter;
