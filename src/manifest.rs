//! Static resource manifest
//!
//! The ordered list of absolute URL paths the app shell needs to load
//! offline. Supplied by the build pipeline, consumed as a constant: this
//! module validates it and never generates it.

use crate::error::{ShellkeepError, ShellkeepResult};
use serde::{Deserialize, Serialize};

/// Validated, ordered list of static resource paths
///
/// Invariants enforced at construction: non-empty, every path absolute
/// (leading `/`), no duplicates. Order is preserved as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct StaticManifest {
    paths: Vec<String>,
}

impl StaticManifest {
    /// Validate and build a manifest from raw paths
    pub fn from_paths(paths: Vec<String>) -> ShellkeepResult<Self> {
        if paths.is_empty() {
            return Err(ShellkeepError::ManifestEmpty);
        }

        for (i, path) in paths.iter().enumerate() {
            if !path.starts_with('/') {
                return Err(ShellkeepError::ManifestPath {
                    path: path.clone(),
                    reason: "must be an absolute URL path".to_string(),
                });
            }
            if paths[..i].contains(path) {
                return Err(ShellkeepError::ManifestPath {
                    path: path.clone(),
                    reason: "duplicate entry".to_string(),
                });
            }
        }

        Ok(Self { paths })
    }

    /// Number of resources in the manifest
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the manifest has no entries (never true for a validated one)
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the manifest lists the given path
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Iterate resource paths in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// The first entry, conventionally the app root path
    pub fn root(&self) -> &str {
        &self.paths[0]
    }
}

impl TryFrom<Vec<String>> for StaticManifest {
    type Error = ShellkeepError;

    fn try_from(paths: Vec<String>) -> ShellkeepResult<Self> {
        Self::from_paths(paths)
    }
}

impl From<StaticManifest> for Vec<String> {
    fn from(manifest: StaticManifest) -> Self {
        manifest.paths
    }
}
