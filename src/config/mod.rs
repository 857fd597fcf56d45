//! Configuration management for shellkeep

pub mod schema;

pub use schema::Config;

use crate::error::{ShellkeepError, ShellkeepResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of a project-local configuration
pub const LOCAL_CONFIG_NAME: &str = "shellkeep.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shellkeep")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shellkeep")
    }

    /// Get the default cache stores directory
    pub fn default_stores_dir() -> PathBuf {
        Self::state_dir().join("stores")
    }

    /// Resolve the stores directory for a loaded configuration
    pub fn stores_dir(config: &Config) -> PathBuf {
        config
            .store
            .dir
            .clone()
            .unwrap_or_else(Self::default_stores_dir)
    }

    /// Path of the claim marker recording the controlling version
    pub fn claim_marker_path(config: &Config) -> PathBuf {
        Self::stores_dir(config).join("current.json")
    }

    /// Find a project-local config by walking up from the given directory
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> ShellkeepResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> ShellkeepResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ShellkeepError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| ShellkeepError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> ShellkeepResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            ShellkeepError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    async fn ensure_config_dir(&self) -> ShellkeepResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ShellkeepError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
