//! Mock cache for testing revocation and token services

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::DomainError;
use crate::repositories::KeyValueCache;
use crate::services::clock::{Clock, ManualClock};

/// In-memory cache whose entries expire against a manual clock
#[derive(Clone)]
pub struct MockCache {
    pub entries: Arc<Mutex<HashMap<String, (String, i64)>>>,
    pub clock: ManualClock,
    pub prefix_delete: bool,
    pub should_fail: Arc<AtomicBool>,
}

impl MockCache {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            prefix_delete: true,
            should_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn without_prefix_delete(mut self) -> Self {
        self.prefix_delete = false;
        self
    }

    pub fn fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Remaining TTL of a live entry
    pub fn ttl_of(&self, key: &str) -> Option<i64> {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(_, expires_at)| expires_at - now)
    }

    pub fn live_keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at > now)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::CacheUnavailable {
                message: "mock cache down".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueCache for MockCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        self.check()?;
        let expires_at = self.clock.now() + ttl_seconds as i64;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.check()?;
        let now = self.clock.now();
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.check()?;
        let now = self.clock.now();
        Ok(self
            .entries
            .lock()
            .unwrap()
            .remove(key)
            .map_or(false, |(_, expires_at)| expires_at > now))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        self.check()?;
        if !self.prefix_delete {
            return Err(DomainError::Unsupported {
                operation: "delete_by_prefix".to_string(),
            });
        }
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        let keys: Vec<String> = entries
            .iter()
            .filter(|(key, (_, expires_at))| key.starts_with(prefix) && *expires_at > now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            entries.remove(key);
        }
        Ok(keys.len())
    }

    fn supports_prefix_delete(&self) -> bool {
        self.prefix_delete
    }
}
