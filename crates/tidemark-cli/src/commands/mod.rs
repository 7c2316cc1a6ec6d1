//! Command implementations.

pub mod config;
pub mod plan;
pub mod run;

pub use self::config::execute_config;
pub use self::plan::execute_plan;
pub use self::run::execute_run;
