use anyhow::{Context, Result};
use clap::Parser;

use campus::{
    app::{load_config, load_config_from},
    cli::{handle_command, handle_offline_command, Cli},
    utils::init_logger,
    CampusCore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => load_config_from(std::slice::from_ref(path))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config().unwrap_or_default(),
    };

    let level = if cli.verbose { "debug" } else { config.log.level.as_str() };
    init_logger(level);

    if handle_offline_command(&cli.command)? {
        return Ok(());
    }

    let core = CampusCore::from_config(&config)?;
    handle_command(&core, &cli.command).await
}
