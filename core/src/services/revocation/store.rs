//! Revocation record persistence over a key/value cache

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::entities::RevocationRecord;
use crate::errors::DomainError;
use crate::repositories::KeyValueCache;
use crate::services::clock::Clock;

/// Shortest lifetime given to a record; non-positive TTLs are raised to it
pub const MIN_RECORD_TTL_SECONDS: u64 = 1;

/// Cache key of the secondary index used when the cache cannot prefix-delete
pub const DEFAULT_INDEX_KEY: &str = "scenegate:revocation_index";

/// Live record keys and their expiry, kept for caches without prefix delete
#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordIndex {
    keys: BTreeMap<String, i64>,
}

impl RecordIndex {
    fn prune(&mut self, now: i64) {
        self.keys.retain(|_, expires_at| *expires_at > now);
    }

    fn ttl(&self, now: i64) -> u64 {
        let latest = self.keys.values().copied().max().unwrap_or(now);
        clamp_ttl(latest - now)
    }
}

/// Revocation record store
///
/// Writes always replace the whole record. When the backing cache supports
/// prefix deletes they are used directly; otherwise every write is also
/// recorded in a secondary index that bulk deletes enumerate. Index updates
/// are read-modify-write, so concurrent writers may drop an entry from the
/// index (never from the records themselves).
pub struct RevocationStore<C: KeyValueCache> {
    cache: C,
    clock: Arc<dyn Clock>,
    index_key: String,
}

impl<C: KeyValueCache> RevocationStore<C> {
    pub fn new(cache: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            index_key: DEFAULT_INDEX_KEY.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &C {
        &self.cache
    }

    /// Whether bulk deletes go through the secondary index
    pub fn uses_index(&self) -> bool {
        !self.cache.supports_prefix_delete()
    }

    /// Write `record` under `key`, replacing any previous record
    pub async fn put(
        &self,
        key: &str,
        record: &RevocationRecord,
        ttl_seconds: i64,
    ) -> Result<(), DomainError> {
        let ttl = clamp_ttl(ttl_seconds);
        if ttl_seconds < MIN_RECORD_TTL_SECONDS as i64 {
            debug!(key, ttl_seconds, "Record TTL raised to minimum");
        }

        let value = serde_json::to_string(record).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode revocation record: {}", e),
        })?;

        // Read the index first so an unreadable one fails before any write
        let index = if self.uses_index() {
            Some(self.load_index().await?)
        } else {
            None
        };

        self.cache.set(key, &value, ttl).await?;
        debug!(key, valid_until = record.valid_until, ttl, "Revocation record written");

        if let Some(mut index) = index {
            let now = self.clock.now();
            index.prune(now);
            index.keys.insert(key.to_string(), now + ttl as i64);
            self.save_index(&index, now).await?;
        }

        Ok(())
    }

    /// Fetch the record stored under `key`
    pub async fn get(&self, key: &str) -> Result<Option<RevocationRecord>, DomainError> {
        match self.cache.get(key).await? {
            Some(value) => serde_json::from_str(&value).map(Some).map_err(|e| {
                warn!(key, "Unreadable revocation record");
                DomainError::Internal {
                    message: format!("Failed to decode revocation record: {}", e),
                }
            }),
            None => Ok(None),
        }
    }

    /// Delete the record under `key`; deleting an absent key is not an error
    pub async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let index = if self.uses_index() {
            Some(self.load_index().await?)
        } else {
            None
        };
        let deleted = self.cache.delete(key).await?;

        if let Some(mut index) = index {
            let now = self.clock.now();
            if index.keys.remove(key).is_some() {
                index.prune(now);
                self.save_index(&index, now).await?;
            }
        }

        Ok(deleted)
    }

    /// Delete every record whose key starts with `prefix`
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        if !self.uses_index() {
            return self.cache.delete_by_prefix(prefix).await;
        }

        let now = self.clock.now();
        let mut index = self.load_index().await?;
        let matching: Vec<String> = index
            .keys
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        let mut deleted = 0;
        for key in &matching {
            if self.cache.delete(key).await? {
                deleted += 1;
            }
            index.keys.remove(key);
        }

        index.prune(now);
        self.save_index(&index, now).await?;
        debug!(prefix, deleted, "Revocation records cleared through index");

        Ok(deleted)
    }

    async fn load_index(&self) -> Result<RecordIndex, DomainError> {
        match self.cache.get(&self.index_key).await? {
            Some(value) => serde_json::from_str(&value).map_err(|e| {
                warn!(key = %self.index_key, "Unreadable revocation index");
                DomainError::Internal {
                    message: format!("Failed to decode revocation index: {}", e),
                }
            }),
            None => Ok(RecordIndex::default()),
        }
    }

    async fn save_index(&self, index: &RecordIndex, now: i64) -> Result<(), DomainError> {
        if index.keys.is_empty() {
            self.cache.delete(&self.index_key).await?;
            return Ok(());
        }

        let value = serde_json::to_string(index).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode revocation index: {}", e),
        })?;
        self.cache.set(&self.index_key, &value, index.ttl(now)).await
    }
}

fn clamp_ttl(ttl_seconds: i64) -> u64 {
    u64::try_from(ttl_seconds)
        .unwrap_or(0)
        .max(MIN_RECORD_TTL_SECONDS)
}
