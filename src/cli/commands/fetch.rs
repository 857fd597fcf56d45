//! Fetch command - serve one request through the cache agent

use crate::agent::{CacheAgent, DiskClientRegistry};
use crate::cli::args::FetchArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{ShellkeepError, ShellkeepResult};
use crate::fetch::NoopFetcher;
use crate::http::Request;
use crate::store::DiskBackend;
use crate::ui;
use std::sync::Arc;
use tokio::fs;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ShellkeepResult<()> {
    let agent_config = config.agent_config()?;

    let backend = Arc::new(DiskBackend::new(ConfigManager::stores_dir(config)));
    let clients = Arc::new(DiskClientRegistry::new(ConfigManager::claim_marker_path(
        config,
    )));
    let agent = CacheAgent::new(agent_config, backend, Arc::new(NoopFetcher), clients);

    let request = if args.navigate {
        Request::navigate(&args.url)
    } else {
        Request::subresource(&args.url)
    };

    let response = agent.on_fetch(&request).await?;

    ui::key_value("url", &args.url);
    ui::key_value("mode", &request.mode.to_string());
    ui::key_value("status", &response.status.to_string());
    if let Some(content_type) = &response.content_type {
        ui::key_value("content-type", content_type);
    }
    ui::key_value("size", &ui::format_bytes(response.body_len() as u64));

    if let Some(path) = args.output {
        let body = response.body.as_deref().unwrap_or_default();
        fs::write(&path, body)
            .await
            .map_err(|e| ShellkeepError::io(format!("writing body to {}", path.display()), e))?;
        ui::step_ok(&format!("Wrote {}", path.display()));
    }

    Ok(())
}
