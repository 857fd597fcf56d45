//! Client control-claim registry
//!
//! After activation an agent takes control of pages opened under a prior
//! version, so their requests route through the new instance without a
//! reload. The registry records which version currently controls clients.

use crate::error::{ShellkeepError, ShellkeepResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tokio::fs;
use tracing::debug;

/// Registry of open clients and the version controlling them
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Take control of all open clients for the given version
    async fn claim(&self, version: &str) -> ShellkeepResult<()>;

    /// The version currently in control, if any
    async fn controller(&self) -> ShellkeepResult<Option<String>>;
}

/// In-process registry for tests and embedded hosts
#[derive(Default)]
pub struct MemoryClientRegistry {
    controller: RwLock<Option<String>>,
    claims: AtomicUsize,
}

impl MemoryClientRegistry {
    /// Create a registry with no controller
    pub fn new() -> Self {
        Self::default()
    }

    /// How many claims have been issued
    pub fn claim_count(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientRegistry for MemoryClientRegistry {
    async fn claim(&self, version: &str) -> ShellkeepResult<()> {
        let mut controller = self
            .controller
            .write()
            .map_err(|e| ShellkeepError::Internal(format!("registry lock poisoned: {}", e)))?;
        *controller = Some(version.to_string());
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn controller(&self) -> ShellkeepResult<Option<String>> {
        let controller = self
            .controller
            .read()
            .map_err(|e| ShellkeepError::Internal(format!("registry lock poisoned: {}", e)))?;
        Ok(controller.clone())
    }
}

/// Claim record persisted by [`DiskClientRegistry`]
#[derive(Debug, Serialize, Deserialize)]
struct ClaimRecord {
    version: String,
    claimed_at: DateTime<Utc>,
}

/// Registry persisted as a marker file next to the disk stores
///
/// The marker is what `shellkeep status` reports as the current version,
/// and what a later process reads to know which deployment is in control.
pub struct DiskClientRegistry {
    path: PathBuf,
}

impl DiskClientRegistry {
    /// Create a registry persisting to the given marker file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ClientRegistry for DiskClientRegistry {
    async fn claim(&self, version: &str) -> ShellkeepResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ShellkeepError::io("creating claim marker directory", e))?;
        }

        let record = ClaimRecord {
            version: version.to_string(),
            claimed_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| ShellkeepError::io(format!("writing claim marker {}", self.path.display()), e))?;

        debug!("Claimed clients for version {}", version);
        Ok(())
    }

    async fn controller(&self) -> ShellkeepResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ShellkeepError::io(format!("reading claim marker {}", self.path.display()), e))?;
        let record: ClaimRecord = serde_json::from_str(&json)?;
        Ok(Some(record.version))
    }
}
