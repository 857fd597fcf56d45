//! The offline cache agent
//!
//! Owns exactly one named cache store per deployed version and mediates
//! requests through it. Three handlers mirror the lifecycle signals:
//! install populates the store, activate reclaims stale versions and claims
//! clients, fetch serves lookups. Fetch never writes; the store is
//! read-only after install.

use crate::agent::clients::ClientRegistry;
use crate::agent::phase::AgentPhase;
use crate::error::{ShellkeepError, ShellkeepResult};
use crate::fetch::ResourceFetcher;
use crate::http::{Request, Response};
use crate::manifest::StaticManifest;
use crate::store::{CacheBackend, CacheEntry, CacheStore as _};
use futures_util::future::try_join_all;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Immutable per-deployment configuration for one agent instance
///
/// Version and cache name are constructor inputs, never process globals,
/// so hosts and tests can run agents with distinct versions side by side.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Opaque deployment version, bumped on deploy
    pub version: String,
    /// Prefix the version is appended to when naming the store
    pub cache_prefix: String,
    /// Path served for every top-level navigation request
    pub navigation_root: String,
    /// Static resources required for the app shell to load offline
    pub manifest: StaticManifest,
}

impl AgentConfig {
    /// The store name for this deployment: `{prefix}-{version}`
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.version)
    }
}

/// Background agent managing one versioned cache store
pub struct CacheAgent {
    config: AgentConfig,
    backend: Arc<dyn CacheBackend>,
    fetcher: Arc<dyn ResourceFetcher>,
    clients: Arc<dyn ClientRegistry>,
    phase: RwLock<AgentPhase>,
}

impl CacheAgent {
    /// Create an agent over a backend, fetcher and client registry
    pub fn new(
        config: AgentConfig,
        backend: Arc<dyn CacheBackend>,
        fetcher: Arc<dyn ResourceFetcher>,
        clients: Arc<dyn ClientRegistry>,
    ) -> Self {
        if !config.manifest.contains(&config.navigation_root) {
            warn!(
                "Navigation root {:?} is not a manifest entry; navigation requests will fail offline",
                config.navigation_root
            );
        }

        Self {
            config,
            backend,
            fetcher,
            clients,
            phase: RwLock::new(AgentPhase::New),
        }
    }

    /// The agent's configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The store name this agent owns
    pub fn cache_name(&self) -> String {
        self.config.cache_name()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> AgentPhase {
        *self.phase.read().expect("phase lock poisoned")
    }

    fn enter(&self, next: AgentPhase) {
        *self.phase.write().expect("phase lock poisoned") = next;
    }

    /// Handle the install signal: populate the versioned store
    ///
    /// The returned future is the "wait until done" acquisition: the caller
    /// must await it before considering the phase settled.
    pub async fn on_install(&self) -> ShellkeepResult<()> {
        self.on_install_with(&|_| {}).await
    }

    /// Install with a per-resource progress callback
    pub async fn on_install_with(
        &self,
        on_resource: &(dyn Fn(&str) + Send + Sync),
    ) -> ShellkeepResult<()> {
        let phase = self.phase();
        if phase.is_in_flight() {
            return Err(ShellkeepError::lifecycle("install", phase));
        }

        self.enter(AgentPhase::Installing);
        match self.populate(on_resource).await {
            Ok(count) => {
                self.enter(AgentPhase::Installed);
                info!("Installed {} with {} resources", self.cache_name(), count);
                Ok(())
            }
            Err(e) => {
                self.enter(AgentPhase::Failed);
                Err(e)
            }
        }
    }

    /// All-or-nothing population: every resource is fetched before any
    /// entry is written, so a partial network failure writes nothing.
    async fn populate(
        &self,
        on_resource: &(dyn Fn(&str) + Send + Sync),
    ) -> ShellkeepResult<usize> {
        let store = self.backend.open(&self.cache_name()).await?;

        let mut fetched = Vec::with_capacity(self.config.manifest.len());
        for path in self.config.manifest.iter() {
            on_resource(path);
            let resource = self.fetcher.fetch(path).await.map_err(|e| {
                ShellkeepError::PopulationFailed {
                    url: path.to_string(),
                    reason: e.to_string(),
                }
            })?;
            fetched.push((path.to_string(), resource));
        }

        for (path, resource) in fetched {
            store
                .put(CacheEntry::new(path, resource.body, resource.content_type))
                .await?;
        }

        Ok(self.config.manifest.len())
    }

    /// Handle the activate signal: reclaim stale stores, then claim clients
    pub async fn on_activate(&self) -> ShellkeepResult<()> {
        let current = self.cache_name();
        let phase = self.phase();

        match phase {
            AgentPhase::Installed | AgentPhase::Active => {}
            // An agent restarted over an installed deployment may activate
            // directly, but only if its store actually exists.
            AgentPhase::New => {
                let names = self.backend.store_names().await?;
                if !names.iter().any(|n| n == &current) {
                    return Err(ShellkeepError::StoreNotFound(current));
                }
            }
            _ => return Err(ShellkeepError::lifecycle("activate", phase)),
        }

        self.enter(AgentPhase::Activating);
        match self.sweep_and_claim(&current).await {
            Ok(()) => {
                self.enter(AgentPhase::Active);
                info!("Activated {} for version {}", current, self.config.version);
                Ok(())
            }
            Err(e) => {
                self.enter(AgentPhase::Failed);
                Err(e)
            }
        }
    }

    async fn sweep_and_claim(&self, current: &str) -> ShellkeepResult<()> {
        let names = self.backend.store_names().await?;
        let stale: Vec<String> = names.into_iter().filter(|n| n != current).collect();

        if !stale.is_empty() {
            debug!("Reclaiming stale stores: {:?}", stale);
        }

        // All deletions settle before control is claimed, so claimed
        // clients never query a store mid-deletion.
        try_join_all(stale.iter().map(|name| self.backend.delete(name))).await?;

        self.clients.claim(&self.config.version).await
    }

    /// Handle an intercepted request
    ///
    /// Navigation requests always resolve to the configured navigation
    /// root, ignoring the requested URL; deep links resolve client-side
    /// after the shell loads. Everything else is an exact-URL lookup with
    /// no network fallback: miss means an empty-body 404.
    pub async fn on_fetch(&self, request: &Request) -> ShellkeepResult<Response> {
        let store = self.backend.open(&self.cache_name()).await?;

        if request.is_navigation() {
            let root = &self.config.navigation_root;
            debug!("Navigation {} -> {}", request.url, root);
            return match store.lookup(root).await? {
                Some(entry) => Ok(entry.to_response()),
                None => Err(ShellkeepError::NavigationRootMissing(root.clone())),
            };
        }

        match store.lookup(&request.url).await? {
            Some(entry) => Ok(entry.to_response()),
            None => Ok(Response::not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::clients::MemoryClientRegistry;
    use crate::fetch::FetchedResource;
    use crate::store::{CacheStore, MemoryBackend};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fetcher serving canned payloads, with optional failure injection
    struct StubFetcher {
        resources: HashMap<String, Vec<u8>>,
        fail_on: Option<String>,
    }

    impl StubFetcher {
        fn for_manifest(manifest: &StaticManifest) -> Self {
            let resources = manifest
                .iter()
                .map(|p| (p.to_string(), format!("payload:{}", p).into_bytes()))
                .collect();
            Self {
                resources,
                fail_on: None,
            }
        }

        fn failing_on(mut self, path: &str) -> Self {
            self.fail_on = Some(path.to_string());
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for StubFetcher {
        async fn fetch(&self, path: &str) -> ShellkeepResult<FetchedResource> {
            if self.fail_on.as_deref() == Some(path) {
                return Err(ShellkeepError::fetch(path, "connection refused"));
            }
            match self.resources.get(path) {
                Some(body) => Ok(FetchedResource {
                    body: body.clone(),
                    content_type: Some("text/plain".to_string()),
                }),
                None => Err(ShellkeepError::FetchStatus {
                    url: path.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn manifest(paths: &[&str]) -> StaticManifest {
        StaticManifest::from_paths(paths.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn config(version: &str, navigation_root: &str, paths: &[&str]) -> AgentConfig {
        AgentConfig {
            version: version.to_string(),
            cache_prefix: "streets-and-houses".to_string(),
            navigation_root: navigation_root.to_string(),
            manifest: manifest(paths),
        }
    }

    fn agent(config: AgentConfig, backend: Arc<MemoryBackend>) -> CacheAgent {
        let fetcher = Arc::new(StubFetcher::for_manifest(&config.manifest));
        CacheAgent::new(
            config,
            backend,
            fetcher,
            Arc::new(MemoryClientRegistry::new()),
        )
    }

    #[tokio::test]
    async fn install_caches_every_manifest_entry() {
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(
            config("v1", "/app/", &["/app/", "/app/index.html", "/app/bundle.js"]),
            Arc::clone(&backend),
        );

        agent.on_install().await.unwrap();
        assert_eq!(agent.phase(), AgentPhase::Installed);

        let store = backend.open("streets-and-houses-v1").await.unwrap();
        for path in ["/app/", "/app/index.html", "/app/bundle.js"] {
            let entry = store.lookup(path).await.unwrap().unwrap();
            assert!(!entry.body.is_empty());
        }
    }

    #[tokio::test]
    async fn population_failure_writes_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        let cfg = config("v1", "/app/", &["/app/", "/app/index.html", "/app/bundle.js"]);
        let fetcher = StubFetcher::for_manifest(&cfg.manifest).failing_on("/app/index.html");
        let agent = CacheAgent::new(
            cfg,
            Arc::clone(&backend) as Arc<dyn CacheBackend>,
            Arc::new(fetcher),
            Arc::new(MemoryClientRegistry::new()),
        );

        let err = agent.on_install().await.unwrap_err();
        assert!(matches!(err, ShellkeepError::PopulationFailed { .. }));
        assert_eq!(agent.phase(), AgentPhase::Failed);

        // All-or-nothing: the first entry was fetchable but must not be written
        let store = backend.open("streets-and-houses-v1").await.unwrap();
        assert_eq!(store.entry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn install_reports_progress_in_manifest_order() {
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(
            config("v1", "/app/", &["/app/", "/app/index.html"]),
            backend,
        );

        let seen = std::sync::Mutex::new(Vec::new());
        agent
            .on_install_with(&|path| seen.lock().unwrap().push(path.to_string()))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["/app/", "/app/index.html"]);
    }

    #[tokio::test]
    async fn navigation_serves_root_regardless_of_url() {
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(
            config("v1", "/app/", &["/app/", "/app/index.html"]),
            backend,
        );
        agent.on_install().await.unwrap();
        agent.on_activate().await.unwrap();

        let root = agent
            .on_fetch(&Request::navigate("/app/"))
            .await
            .unwrap();
        let deep_link = agent
            .on_fetch(&Request::navigate("/app/settings/profile"))
            .await
            .unwrap();

        assert_eq!(root, deep_link);
        assert_eq!(root.body.as_deref(), Some(b"payload:/app/".as_slice()));
    }

    #[tokio::test]
    async fn uncached_subresource_is_404_with_empty_body() {
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(
            config("v1", "/app/", &["/app/", "/app/index.html"]),
            backend,
        );
        agent.on_install().await.unwrap();
        agent.on_activate().await.unwrap();

        let res = agent
            .on_fetch(&Request::subresource("/app/missing.png"))
            .await
            .unwrap();
        assert_eq!(res.status, 404);
        assert_eq!(res.body, None);
    }

    #[tokio::test]
    async fn cached_subresource_served_verbatim() {
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(
            config("v1", "/app/", &["/app/", "/app/index.html"]),
            backend,
        );
        agent.on_install().await.unwrap();

        let res = agent
            .on_fetch(&Request::subresource("/app/index.html"))
            .await
            .unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(
            res.body.as_deref(),
            Some(b"payload:/app/index.html".as_slice())
        );
    }

    #[tokio::test]
    async fn navigation_root_mismatch_is_an_error_not_404() {
        // Mirrors the original deployment bug: navigation root "/" while
        // the manifest only lists "/app/..." paths.
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(config("v1", "/", &["/app/", "/app/index.html"]), backend);
        agent.on_install().await.unwrap();

        let err = agent
            .on_fetch(&Request::navigate("/app/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShellkeepError::NavigationRootMissing(_)));
    }

    #[tokio::test]
    async fn activate_prunes_stale_stores_then_claims() {
        let backend = Arc::new(MemoryBackend::new());
        let clients = Arc::new(MemoryClientRegistry::new());

        // Leftovers from earlier deployments
        backend.open("streets-and-houses-v0").await.unwrap();
        backend.open("unrelated-store").await.unwrap();

        let cfg = config("v1", "/app/", &["/app/"]);
        let fetcher = Arc::new(StubFetcher::for_manifest(&cfg.manifest));
        let agent = CacheAgent::new(
            cfg,
            Arc::clone(&backend) as Arc<dyn CacheBackend>,
            fetcher,
            Arc::clone(&clients) as Arc<dyn ClientRegistry>,
        );

        agent.on_install().await.unwrap();
        agent.on_activate().await.unwrap();

        assert_eq!(agent.phase(), AgentPhase::Active);
        assert_eq!(
            backend.store_names().await.unwrap(),
            vec!["streets-and-houses-v1"]
        );
        assert_eq!(clients.controller().await.unwrap(), Some("v1".to_string()));
    }

    #[tokio::test]
    async fn activate_is_idempotent_on_current_state() {
        let backend = Arc::new(MemoryBackend::new());
        let clients = Arc::new(MemoryClientRegistry::new());
        let cfg = config("v1", "/app/", &["/app/"]);
        let fetcher = Arc::new(StubFetcher::for_manifest(&cfg.manifest));
        let agent = CacheAgent::new(
            cfg,
            Arc::clone(&backend) as Arc<dyn CacheBackend>,
            fetcher,
            Arc::clone(&clients) as Arc<dyn ClientRegistry>,
        );

        agent.on_install().await.unwrap();
        agent.on_activate().await.unwrap();
        agent.on_activate().await.unwrap();

        // No store deleted, claim issued again
        assert_eq!(
            backend.store_names().await.unwrap(),
            vec!["streets-and-houses-v1"]
        );
        assert_eq!(clients.claim_count(), 2);
    }

    #[tokio::test]
    async fn activate_before_install_is_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let agent = agent(config("v1", "/app/", &["/app/"]), backend);

        let err = agent.on_activate().await.unwrap_err();
        assert!(matches!(err, ShellkeepError::StoreNotFound(_)));
        assert_eq!(agent.phase(), AgentPhase::New);
    }

    #[tokio::test]
    async fn restarted_agent_activates_over_existing_store() {
        let backend = Arc::new(MemoryBackend::new());

        // First process installs
        let installer = agent(config("v1", "/app/", &["/app/"]), Arc::clone(&backend));
        installer.on_install().await.unwrap();

        // Second process wakes in New over the same backend
        let restarted = agent(config("v1", "/app/", &["/app/"]), backend);
        restarted.on_activate().await.unwrap();
        assert_eq!(restarted.phase(), AgentPhase::Active);
    }

    #[tokio::test]
    async fn install_retry_after_failure() {
        let backend = Arc::new(MemoryBackend::new());
        let cfg = config("v1", "/app/", &["/app/"]);
        let failing = StubFetcher::for_manifest(&cfg.manifest).failing_on("/app/");
        let agent = CacheAgent::new(
            cfg.clone(),
            Arc::clone(&backend) as Arc<dyn CacheBackend>,
            Arc::new(failing),
            Arc::new(MemoryClientRegistry::new()),
        );

        assert!(agent.on_install().await.is_err());
        assert_eq!(agent.phase(), AgentPhase::Failed);

        // The same instance may retry once the network recovers; here we
        // model recovery by deploying a fresh agent with a working fetcher.
        let recovered = CacheAgent::new(
            cfg,
            backend as Arc<dyn CacheBackend>,
            Arc::new(StubFetcher::for_manifest(&manifest(&["/app/"]))),
            Arc::new(MemoryClientRegistry::new()),
        );
        recovered.on_install().await.unwrap();
        assert_eq!(recovered.phase(), AgentPhase::Installed);
    }
}
