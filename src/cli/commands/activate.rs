//! Activate command - prune stale store versions and claim control

use crate::agent::{CacheAgent, DiskClientRegistry};
use crate::config::{Config, ConfigManager};
use crate::error::ShellkeepResult;
use crate::fetch::NoopFetcher;
use crate::store::{CacheBackend, DiskBackend};
use crate::ui;
use std::sync::Arc;

/// Execute the activate command
pub async fn execute(config: &Config) -> ShellkeepResult<()> {
    let agent_config = config.agent_config()?;

    let backend = Arc::new(DiskBackend::new(ConfigManager::stores_dir(config)));
    let clients = Arc::new(DiskClientRegistry::new(ConfigManager::claim_marker_path(
        config,
    )));

    let before = backend.store_names().await?;

    let agent = CacheAgent::new(
        agent_config,
        Arc::clone(&backend) as Arc<dyn CacheBackend>,
        Arc::new(NoopFetcher),
        clients,
    );
    agent.on_activate().await?;

    let current = agent.cache_name();
    let pruned: Vec<&String> = before.iter().filter(|name| **name != current).collect();

    if pruned.is_empty() {
        println!("No stale stores to prune.");
    } else {
        for name in &pruned {
            ui::step_info(&format!("Removed {}", name));
        }
    }

    ui::step_ok(&format!(
        "{} is in control (version {})",
        current, config.app.version
    ));
    Ok(())
}
