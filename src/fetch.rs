//! Resource fetching for cache population
//!
//! Install-time bulk population needs a way to turn manifest paths into
//! payloads. [`HttpFetcher`] pulls them from the deployed origin;
//! [`DirFetcher`] reads them straight out of a local build-output tree,
//! which also keeps tests and air-gapped installs off the network.

use crate::error::{ShellkeepError, ShellkeepResult};
use crate::http::guess_content_type;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// A fetched resource payload
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Raw payload bytes
    pub body: Vec<u8>,
    /// MIME type, when the source reports or implies one
    pub content_type: Option<String>,
}

/// Turns a manifest path into a payload
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch one resource by its absolute URL path
    async fn fetch(&self, path: &str) -> ShellkeepResult<FetchedResource>;
}

/// Fetches resources from the deployed origin over HTTP
pub struct HttpFetcher {
    agent: ureq::Agent,
    origin: String,
}

impl HttpFetcher {
    /// Create a fetcher for an origin such as `https://example.com`
    pub fn new(origin: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> ShellkeepResult<FetchedResource> {
        let url = format!("{}{}", self.origin, path);
        let agent = self.agent.clone();

        debug!("Fetching {}", url);

        // ureq is a blocking client; keep it off the async executor
        let request_url = url.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut response = agent
                .get(&request_url)
                .call()
                .map_err(|e| ShellkeepError::fetch(&request_url, e.to_string()))?;

            let status = response.status().as_u16();
            if !(200..300).contains(&status) {
                return Err(ShellkeepError::FetchStatus {
                    url: request_url.clone(),
                    status,
                });
            }

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.split(';').next().unwrap_or(s).trim().to_string());

            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| ShellkeepError::fetch(&request_url, e.to_string()))?;

            Ok(FetchedResource { body, content_type })
        })
        .await
        .map_err(|e| ShellkeepError::Internal(format!("fetch task panicked: {}", e)))?;

        result
    }
}

/// Fetcher that fails every fetch
///
/// Activation and fetch handling never populate; agents constructed for
/// those paths alone carry this fetcher so they cannot touch the network.
pub struct NoopFetcher;

#[async_trait]
impl ResourceFetcher for NoopFetcher {
    async fn fetch(&self, path: &str) -> ShellkeepResult<FetchedResource> {
        Err(ShellkeepError::fetch(path, "no fetcher configured"))
    }
}

/// Fetches resources from a local directory tree
///
/// The tree is the build pipeline's output: each manifest path maps onto a
/// file under the root, and a trailing `/` resolves to that directory's
/// `index.html`.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    /// Create a fetcher rooted at a build-output directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> ShellkeepResult<PathBuf> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(ShellkeepError::fetch(path, "path traversal rejected"));
        }

        let relative = path.trim_start_matches('/');
        let file = if path.ends_with('/') {
            self.root.join(relative).join("index.html")
        } else {
            self.root.join(relative)
        };
        Ok(file)
    }
}

#[async_trait]
impl ResourceFetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> ShellkeepResult<FetchedResource> {
        let file = self.resolve(path)?;
        debug!("Reading {} for {}", file.display(), path);

        let body = fs::read(&file).await.map_err(|e| {
            ShellkeepError::fetch(path, format!("{}: {}", file.display(), e))
        })?;

        let content_type = file
            .to_str()
            .and_then(guess_content_type)
            .map(String::from);

        Ok(FetchedResource { body, content_type })
    }
}
