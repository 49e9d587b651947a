use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::debug;

use eventhub::{
    app::{load_config, load_config_file, AppState},
    cli::{handle_command, run_init, Cli, Commands, ConsoleShell},
    session::InitOutcome,
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(if cli.verbose { "debug" } else { "info" });

    // Init writes the config files, so it must not depend on them
    if matches!(cli.command, Commands::Init) {
        return run_init();
    }

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    let shell = Arc::new(ConsoleShell);
    let state = AppState::bootstrap(config, shell.clone())?;
    if let InitOutcome::Restored(user) = &state.init_outcome {
        debug!(user = %user.email, "Restored stored session");
    }

    handle_command(&cli.command, &state, shell.as_ref()).await
}
