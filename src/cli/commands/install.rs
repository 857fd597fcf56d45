//! Install command - populate the versioned cache store

use crate::agent::{CacheAgent, DiskClientRegistry};
use crate::cli::args::InstallArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{ShellkeepError, ShellkeepResult};
use crate::fetch::{DirFetcher, HttpFetcher, ResourceFetcher};
use crate::store::{CacheBackend, CacheStore as _, DiskBackend};
use crate::ui::{self, InstallProgress};
use console::style;
use std::sync::Arc;
use tracing::debug;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> ShellkeepResult<()> {
    let agent_config = config.agent_config()?;

    let fetcher: Arc<dyn ResourceFetcher> = match &args.from {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(ShellkeepError::PathNotFound(dir.clone()));
            }
            debug!("Populating from directory {}", dir.display());
            Arc::new(DirFetcher::new(dir.clone()))
        }
        None => match &config.app.origin {
            Some(origin) => {
                debug!("Populating from origin {}", origin);
                Arc::new(HttpFetcher::new(origin.clone()))
            }
            None => return Err(ShellkeepError::OriginMissing),
        },
    };

    let backend = Arc::new(DiskBackend::new(ConfigManager::stores_dir(config)));
    let clients = Arc::new(DiskClientRegistry::new(ConfigManager::claim_marker_path(
        config,
    )));
    let agent = CacheAgent::new(
        agent_config,
        Arc::clone(&backend) as Arc<dyn CacheBackend>,
        fetcher,
        clients,
    );

    let cache_name = agent.cache_name();
    let total = agent.config().manifest.len();
    println!(
        "Installing {} ({} resources)",
        style(&cache_name).bold(),
        total
    );

    let progress = InstallProgress::new(total as u64);
    match agent.on_install_with(&|path| progress.resource(path)).await {
        Ok(()) => progress.finish(),
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    }

    let store = backend.open(&cache_name).await?;
    let bytes = store.total_bytes().await?;
    ui::step_ok(&format!(
        "Cached {} resources ({})",
        total,
        ui::format_bytes(bytes)
    ));
    ui::step_info("Run: shellkeep activate");

    Ok(())
}
