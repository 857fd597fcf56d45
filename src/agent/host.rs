//! Lifecycle host driving agent deployments
//!
//! The host stands in for the platform's event dispatch: it runs a deploy
//! (install, then activate, each awaited to settlement) and routes
//! intercepted requests to whichever instance is in control. Until a
//! deploy's claim-over completes, requests keep flowing to the
//! predecessor; a failed deploy leaves the predecessor in control.

use crate::agent::worker::CacheAgent;
use crate::error::{ShellkeepError, ShellkeepResult};
use crate::http::{Request, Response};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Event host owning the controlling agent instance
#[derive(Default)]
pub struct AgentHost {
    active: RwLock<Option<Arc<CacheAgent>>>,
}

impl AgentHost {
    /// Create a host with no controlling agent
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy an agent: install, activate, then take control
    ///
    /// Both lifecycle handlers are awaited to completion before the swap;
    /// an error from either leaves the previous agent in control and
    /// propagates to the caller.
    pub async fn deploy(&self, agent: Arc<CacheAgent>) -> ShellkeepResult<()> {
        let name = agent.cache_name();
        debug!("Deploying {}", name);

        agent.on_install().await?;
        agent.on_activate().await?;

        let mut active = self.active.write().await;
        *active = Some(agent);
        info!("{} is now in control", name);
        Ok(())
    }

    /// Route an intercepted request to the controlling agent
    pub async fn dispatch(&self, request: &Request) -> ShellkeepResult<Response> {
        let agent = {
            let active = self.active.read().await;
            active.clone()
        };

        match agent {
            Some(agent) => agent.on_fetch(request).await,
            None => Err(ShellkeepError::NoControllingAgent),
        }
    }

    /// Version of the controlling agent, if any
    pub async fn controlling_version(&self) -> Option<String> {
        let active = self.active.read().await;
        active.as_ref().map(|a| a.config().version.clone())
    }
}
