//! Tidemark CLI - Export and rotate timestamped database snapshots.

use clap::Parser;
use tidemark_cli::commands;
use tidemark_cli::{logging, Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tidemark_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Load config, then let flags win
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(&cli);

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Handle commands
    match cli.command {
        None => {
            commands::execute_run(cli.run, &config, &formatter).await?;
        }
        Some(Command::Run(args)) => {
            commands::execute_run(cli.run.merge(args), &config, &formatter).await?;
        }
        Some(Command::Plan(args)) => {
            commands::execute_plan(args, &config, &formatter).await?;
        }
        Some(Command::Config(args)) => {
            commands::execute_config(args, &config, &formatter).await?;
        }
    }

    Ok(())
}
