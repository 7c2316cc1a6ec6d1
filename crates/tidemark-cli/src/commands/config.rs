//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the config command.
pub async fn execute_config(
    args: ConfigArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let path = Config::path()?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("{}", formatter.info("File does not exist; built-in defaults apply"));
            }
        }
    }

    Ok(())
}
