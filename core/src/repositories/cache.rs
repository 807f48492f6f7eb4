//! Key/value cache contract backing the revocation store.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::DomainError;

/// Minimal cache contract: per-key TTL, no queries, no transactions
///
/// Implementations map transport failures to `DomainError::CacheUnavailable`
/// and never retry beyond their own connection-level policy.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Delete `key`; returns whether a value was removed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Delete every key starting with `prefix`; returns the number removed
    ///
    /// Backends that cannot match keys return `DomainError::Unsupported`
    /// and report `false` from [`KeyValueCache::supports_prefix_delete`].
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let _ = prefix;
        Err(DomainError::Unsupported {
            operation: "delete_by_prefix".to_string(),
        })
    }

    /// Whether [`KeyValueCache::delete_by_prefix`] is available
    fn supports_prefix_delete(&self) -> bool {
        false
    }
}

#[async_trait]
impl<T: KeyValueCache + ?Sized> KeyValueCache for Arc<T> {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        (**self).delete(key).await
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        (**self).delete_by_prefix(prefix).await
    }

    fn supports_prefix_delete(&self) -> bool {
        (**self).supports_prefix_delete()
    }
}
