//! On-disk cache backend
//!
//! Persists each named store as a directory under the backend root. Every
//! entry is a pair of files keyed by the SHA256 of its URL: `<key>.json`
//! holds metadata and `<key>.bin` holds the raw payload. The body file is
//! written before the metadata file, so a metadata file always refers to a
//! complete payload.

use crate::error::{ShellkeepError, ShellkeepResult};
use crate::store::{body_digest, url_key, CacheBackend, CacheEntry, CacheStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Per-entry metadata persisted next to the payload
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    content_type: Option<String>,
    digest: String,
    cached_at: DateTime<Utc>,
    size: u64,
}

/// Disk-backed cache backend rooted at a stores directory
pub struct DiskBackend {
    root: PathBuf,
}

impl DiskBackend {
    /// Create a backend over the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The backend's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_root(&self) -> ShellkeepResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ShellkeepError::io(format!("creating stores root {}", self.root.display()), e))
    }
}

#[async_trait]
impl CacheBackend for DiskBackend {
    async fn open(&self, name: &str) -> ShellkeepResult<Arc<dyn CacheStore>> {
        self.ensure_root().await?;

        let dir = self.root.join(name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ShellkeepError::StoreCreate {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Opened disk store {} at {}", name, dir.display());
        Ok(Arc::new(DiskStore {
            name: name.to_string(),
            dir,
        }))
    }

    async fn store_names(&self) -> ShellkeepResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ShellkeepError::io(format!("reading stores root {}", self.root.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShellkeepError::io("listing stores", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| ShellkeepError::io("inspecting store entry", e))?
                .is_dir();
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> ShellkeepResult<bool> {
        let dir = self.root.join(name);
        if !dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| ShellkeepError::io(format!("deleting store {}", name), e))?;

        debug!("Deleted disk store {}", name);
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

/// Handle to one on-disk store directory
pub struct DiskStore {
    name: String,
    dir: PathBuf,
}

impl DiskStore {
    fn meta_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", url_key(url)))
    }

    fn body_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", url_key(url)))
    }

    fn corrupt(&self, reason: impl Into<String>) -> ShellkeepError {
        ShellkeepError::EntryCorrupt {
            store: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, entry: CacheEntry) -> ShellkeepResult<()> {
        let meta = EntryMeta {
            url: entry.url.clone(),
            content_type: entry.content_type.clone(),
            digest: entry.digest.clone(),
            cached_at: entry.cached_at,
            size: entry.body.len() as u64,
        };

        // Body first: a meta file must never point at a missing payload
        fs::write(self.body_path(&entry.url), &entry.body)
            .await
            .map_err(|e| ShellkeepError::io(format!("writing payload for {}", entry.url), e))?;

        let json = serde_json::to_string_pretty(&meta)?;
        fs::write(self.meta_path(&entry.url), json)
            .await
            .map_err(|e| ShellkeepError::io(format!("writing metadata for {}", entry.url), e))?;

        Ok(())
    }

    async fn lookup(&self, url: &str) -> ShellkeepResult<Option<CacheEntry>> {
        let meta_path = self.meta_path(url);
        if !meta_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&meta_path)
            .await
            .map_err(|e| ShellkeepError::io(format!("reading metadata for {}", url), e))?;
        let meta: EntryMeta = serde_json::from_str(&json)
            .map_err(|e| self.corrupt(format!("metadata for {}: {}", url, e)))?;

        let body = fs::read(self.body_path(url))
            .await
            .map_err(|e| self.corrupt(format!("payload for {}: {}", url, e)))?;

        if body_digest(&body) != meta.digest {
            return Err(self.corrupt(format!("digest mismatch for {}", url)));
        }

        Ok(Some(CacheEntry {
            url: meta.url,
            body,
            content_type: meta.content_type,
            digest: meta.digest,
            cached_at: meta.cached_at,
        }))
    }

    async fn urls(&self) -> ShellkeepResult<Vec<String>> {
        let mut urls = Vec::new();
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| ShellkeepError::io(format!("reading store {}", self.name), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShellkeepError::io("listing entries", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path)
                    .await
                    .map_err(|e| ShellkeepError::io("reading entry metadata", e))?;
                let meta: EntryMeta = serde_json::from_str(&json)
                    .map_err(|e| self.corrupt(format!("{}: {}", path.display(), e)))?;
                urls.push(meta.url);
            }
        }

        urls.sort();
        Ok(urls)
    }

    async fn entry_count(&self) -> ShellkeepResult<usize> {
        Ok(self.urls().await?.len())
    }

    async fn total_bytes(&self) -> ShellkeepResult<u64> {
        let mut total = 0u64;
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| ShellkeepError::io(format!("reading store {}", self.name), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShellkeepError::io("listing entries", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "bin") {
                let meta = entry
                    .metadata()
                    .await
                    .map_err(|e| ShellkeepError::io("reading entry size", e))?;
                total += meta.len();
            }
        }

        Ok(total)
    }
}
