//! Versioned cache store abstraction
//!
//! Models the platform cache API as a pair of traits: a [`CacheBackend`]
//! owns named stores (open-or-create, enumerate, delete) and a
//! [`CacheStore`] maps request URLs to previously fetched payloads.
//! Entries are written only during install and reclaimed only by deleting
//! their owning store; nothing writes at fetch time.

mod disk;
mod memory;

pub use disk::{DiskBackend, DiskStore};
pub use memory::{MemoryBackend, MemoryStore};

use crate::error::ShellkeepResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// A cached response payload keyed by request URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Exact URL path this entry is keyed by
    pub url: String,
    /// Response payload
    pub body: Vec<u8>,
    /// MIME type reported at fetch time, when known
    pub content_type: Option<String>,
    /// SHA256 hex digest of the body
    pub digest: String,
    /// When the entry was populated
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry, computing the body digest
    pub fn new(url: impl Into<String>, body: Vec<u8>, content_type: Option<String>) -> Self {
        let digest = body_digest(&body);
        Self {
            url: url.into(),
            body,
            content_type,
            digest,
            cached_at: Utc::now(),
        }
    }

    /// Serve this entry verbatim as a response
    pub fn to_response(&self) -> crate::http::Response {
        crate::http::Response::ok(self.body.clone(), self.content_type.clone())
    }
}

/// SHA256 hex digest of a payload
pub fn body_digest(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Stable file-name key for a URL (SHA256 hex of the URL string)
pub fn url_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// One named cache store
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The store's name (prefix + version)
    fn name(&self) -> &str;

    /// Insert or replace the entry for a URL
    async fn put(&self, entry: CacheEntry) -> ShellkeepResult<()>;

    /// Look up an entry by exact URL
    async fn lookup(&self, url: &str) -> ShellkeepResult<Option<CacheEntry>>;

    /// All cached URLs, in unspecified order
    async fn urls(&self) -> ShellkeepResult<Vec<String>>;

    /// Number of entries in the store
    async fn entry_count(&self) -> ShellkeepResult<usize>;

    /// Total payload bytes across all entries
    async fn total_bytes(&self) -> ShellkeepResult<u64>;
}

/// Owner of named cache stores
///
/// Implemented by the in-memory backend (tests, embedding) and the on-disk
/// backend (the CLI's persistent deployment store).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Open a store by name, creating it if absent
    async fn open(&self, name: &str) -> ShellkeepResult<Arc<dyn CacheStore>>;

    /// Enumerate all store names owned by this backend
    async fn store_names(&self) -> ShellkeepResult<Vec<String>>;

    /// Delete a store and all its entries; returns false if it did not exist
    async fn delete(&self, name: &str) -> ShellkeepResult<bool>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
