//! Shellkeep - versioned offline cache for single-page app shells
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use shellkeep::cli::{commands, Cli, Commands};
use shellkeep::config::ConfigManager;
use shellkeep::error::ShellkeepResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ShellkeepResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("shellkeep=warn"),
        1 => EnvFilter::new("shellkeep=info"),
        _ => EnvFilter::new("shellkeep=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Init command doesn't need config loading
    if let Commands::Init(args) = cli.command {
        return commands::init(args).await;
    }

    let manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        ConfigManager::new()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| shellkeep::error::ShellkeepError::io("getting current directory", e))?;
        match ConfigManager::find_local_config(&cwd) {
            Some(path) => {
                debug!("Found local config: {}", path.display());
                ConfigManager::with_path(path)
            }
            None => ConfigManager::new(),
        }
    };

    let config = manager.load().await?;

    match cli.command {
        Commands::Init(_) => unreachable!("Init handled above"),
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Activate => commands::activate(&config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Status(args) => commands::status(args, &config).await,
        Commands::Config(args) => commands::config(args, &manager, &config).await,
    }
}
