//! In-memory cache backend
//!
//! Used by tests and by hosts that embed the agent without persistence.
//! All stores share one map behind an async lock; store handles stay valid
//! across a delete and simply miss afterwards, matching open-or-create
//! semantics.

use crate::error::ShellkeepResult;
use crate::store::{CacheBackend, CacheEntry, CacheStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type StoreMap = HashMap<String, CacheEntry>;
type BackendMap = HashMap<String, StoreMap>;

/// In-memory backend holding all named stores
#[derive(Default)]
pub struct MemoryBackend {
    stores: Arc<RwLock<BackendMap>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn open(&self, name: &str) -> ShellkeepResult<Arc<dyn CacheStore>> {
        let mut stores = self.stores.write().await;
        stores.entry(name.to_string()).or_default();

        Ok(Arc::new(MemoryStore {
            name: name.to_string(),
            stores: Arc::clone(&self.stores),
        }))
    }

    async fn store_names(&self) -> ShellkeepResult<Vec<String>> {
        let stores = self.stores.read().await;
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> ShellkeepResult<bool> {
        let mut stores = self.stores.write().await;
        Ok(stores.remove(name).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Handle to one named in-memory store
pub struct MemoryStore {
    name: String,
    stores: Arc<RwLock<BackendMap>>,
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, entry: CacheEntry) -> ShellkeepResult<()> {
        let mut stores = self.stores.write().await;
        let store = stores.entry(self.name.clone()).or_default();
        store.insert(entry.url.clone(), entry);
        Ok(())
    }

    async fn lookup(&self, url: &str) -> ShellkeepResult<Option<CacheEntry>> {
        let stores = self.stores.read().await;
        Ok(stores.get(&self.name).and_then(|s| s.get(url)).cloned())
    }

    async fn urls(&self) -> ShellkeepResult<Vec<String>> {
        let stores = self.stores.read().await;
        let mut urls: Vec<String> = stores
            .get(&self.name)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        urls.sort();
        Ok(urls)
    }

    async fn entry_count(&self) -> ShellkeepResult<usize> {
        let stores = self.stores.read().await;
        Ok(stores.get(&self.name).map_or(0, HashMap::len))
    }

    async fn total_bytes(&self) -> ShellkeepResult<u64> {
        let stores = self.stores.read().await;
        Ok(stores
            .get(&self.name)
            .map_or(0, |s| s.values().map(|e| e.body.len() as u64).sum()))
    }
}
