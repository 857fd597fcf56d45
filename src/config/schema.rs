//! Configuration schema for shellkeep
//!
//! Configuration is stored at `~/.config/shellkeep/config.toml`, or as a
//! project-local `shellkeep.toml` produced by the build pipeline alongside
//! the app bundle.

use crate::agent::AgentConfig;
use crate::error::ShellkeepResult;
use crate::manifest::StaticManifest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application identity and versioning
    pub app: AppConfig,

    /// Static resource manifest
    pub manifest: ManifestConfig,

    /// Store location settings
    pub store: StoreConfig,
}

impl Config {
    /// Build the immutable agent configuration, validating the manifest
    pub fn agent_config(&self) -> ShellkeepResult<AgentConfig> {
        let manifest = StaticManifest::from_paths(self.manifest.resources.clone())?;
        Ok(AgentConfig {
            version: self.app.version.clone(),
            cache_prefix: self.app.name.clone(),
            navigation_root: self.app.navigation_root.clone(),
            manifest,
        })
    }

    /// The store name the current configuration resolves to
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.app.name, self.app.version)
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Cache name prefix, typically the app's slug
    pub name: String,

    /// Deployment version; bump on every deploy
    pub version: String,

    /// Origin to fetch resources from during install (e.g. `https://example.com`)
    pub origin: Option<String>,

    /// Path served for every navigation request.
    /// The conventional platform default is `/`; point it at the manifest
    /// root if the app is deployed under a sub-path.
    pub navigation_root: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            version: "v1".to_string(),
            origin: None,
            navigation_root: "/".to_string(),
        }
    }
}

/// Static manifest settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Absolute URL paths the app shell needs to load offline
    pub resources: Vec<String>,
}

/// Store location settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the cache stores; defaults to the state dir
    pub dir: Option<PathBuf>,
}
