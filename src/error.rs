//! Error types for shellkeep
//!
//! All modules use `ShellkeepResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shellkeep operations
pub type ShellkeepResult<T> = Result<T, ShellkeepError>;

/// All errors that can occur in shellkeep
#[derive(Error, Debug)]
pub enum ShellkeepError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No origin configured; HTTP install requires [app] origin or --from <dir>")]
    OriginMissing,

    // Manifest errors
    #[error("Static manifest is empty")]
    ManifestEmpty,

    #[error("Invalid manifest path {path:?}: {reason}")]
    ManifestPath { path: String, reason: String },

    // Store errors
    #[error("Cache store not found: {0}")]
    StoreNotFound(String),

    #[error("Failed to create cache store {name}: {reason}")]
    StoreCreate { name: String, reason: String },

    #[error("Corrupt cache entry in store {store}: {reason}")]
    EntryCorrupt { store: String, reason: String },

    // Resource fetch errors
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Unexpected status {status} fetching {url}")]
    FetchStatus { url: String, status: u16 },

    #[error("Cache population aborted at {url}: {reason}")]
    PopulationFailed { url: String, reason: String },

    // Lifecycle errors
    #[error("Signal '{signal}' not allowed in phase '{phase}'")]
    Lifecycle { signal: String, phase: String },

    #[error("Navigation root {0:?} is not cached")]
    NavigationRootMissing(String),

    #[error("No agent is in control; deploy one first")]
    NoControllingAgent,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShellkeepError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a resource fetch error
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a lifecycle violation error
    pub fn lifecycle(signal: impl Into<String>, phase: impl std::fmt::Display) -> Self {
        Self::Lifecycle {
            signal: signal.into(),
            phase: phase.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => Some("Run: shellkeep init"),
            Self::StoreNotFound(_) => Some("Run: shellkeep install"),
            Self::OriginMissing => Some("Set origin in shellkeep.toml or pass --from <dir>"),
            Self::NavigationRootMissing(_) => {
                Some("Check that [app] navigation_root matches a manifest entry")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ShellkeepError::StoreNotFound("app-v1".to_string());
        assert!(err.to_string().contains("app-v1"));
    }

    #[test]
    fn error_hint() {
        let err = ShellkeepError::ConfigNotFound(PathBuf::from("/tmp/shellkeep.toml"));
        assert_eq!(err.hint(), Some("Run: shellkeep init"));
    }

    #[test]
    fn lifecycle_helper() {
        let err = ShellkeepError::lifecycle("activate", "new");
        assert!(err.to_string().contains("activate"));
        assert!(err.to_string().contains("new"));
    }
}
