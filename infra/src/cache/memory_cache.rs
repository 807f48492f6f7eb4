//! In-process cache with per-key expiry

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use sg_core::errors::DomainError;
use sg_core::repositories::KeyValueCache;
use sg_core::services::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: i64,
}

/// [`KeyValueCache`] kept in process memory
///
/// Entries expire against the injected [`Clock`]; expired entries are
/// invisible immediately and dropped lazily or by [`MemoryCache::purge_expired`].
/// Clones share the same storage.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
    prefix_delete: bool,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create an empty cache on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            prefix_delete: true,
        }
    }

    /// Report prefix deletes as unsupported, as a plain key/value store would
    pub fn without_prefix_delete(mut self) -> Self {
        self.prefix_delete = false;
        self
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of a live entry in seconds
    pub async fn ttl(&self, key: &str) -> Option<i64> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        purged
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let expires_at = self.clock.now().saturating_add(ttl);
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        debug!("Set key '{}' with expiry {}s", key, ttl_seconds);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
                Some(_) => {}
            }
        }

        self.entries
            .write()
            .await
            .retain(|k, entry| k != key || entry.expires_at > now);
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let now = self.clock.now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.map_or(false, |entry| entry.expires_at > now))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        if !self.prefix_delete {
            return Err(DomainError::Unsupported {
                operation: "delete_by_prefix".to_string(),
            });
        }

        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let mut deleted = 0;
        entries.retain(|key, entry| {
            if !key.starts_with(prefix) {
                return true;
            }
            if entry.expires_at > now {
                deleted += 1;
            }
            false
        });

        debug!(prefix, deleted, "Deleted keys by prefix");
        Ok(deleted)
    }

    fn supports_prefix_delete(&self) -> bool {
        self.prefix_delete
    }
}
