//! Redis cache client implementation
//!
//! This module provides a Redis-backed [`KeyValueCache`] with retry logic
//! for the revocation store. Records are written with `SET EX`, and bulk
//! clears walk the keyspace with `SCAN MATCH` before deleting each page.

use async_trait::async_trait;
use redis::{
    aio::MultiplexedConnection, AsyncCommands, Client, IntoConnectionInfo, RedisError, RedisResult,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use sg_core::errors::DomainError;
use sg_core::repositories::KeyValueCache;
use sg_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Redis cache client with retry logic
///
/// Clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisCache {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisCache {
    /// Connect to Redis, retrying with exponential backoff
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Example
    /// ```no_run
    /// use sg_infra::cache::RedisCache;
    /// use sg_shared::config::CacheConfig;
    ///
    /// async fn create_cache() -> Result<RedisCache, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("auth");
    ///     Ok(RedisCache::new(config).await?)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            url = %mask_url(&config.url),
            database = config.database,
            "Creating Redis cache client"
        );

        let mut connection_info = config.url.as_str().into_connection_info().map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;
        if config.database != 0 {
            connection_info.redis.db = i64::from(config.database);
        }

        let client = Client::open(connection_info).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            InfrastructureError::Config(format!("Invalid Redis connection settings: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        info!("Redis cache client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Retries transient failures with exponential backoff.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(
            MultiplexedConnection,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        let key = self.config.make_key(key);
        debug!("Setting key '{}' with expiry {}s", key, ttl_seconds);

        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            let value = value.to_string();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await })
        })
        .await
        .map_err(|e| unavailable("set", &key, e))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let key = self.config.make_key(key);
        debug!("Getting key '{}'", key);

        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| unavailable("get", &key, e))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let key = self.config.make_key(key);
        debug!("Deleting key '{}'", key);

        let deleted_count = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(|e| unavailable("delete", &key, e))?;

        Ok(deleted_count > 0)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let pattern = format!("{}*", escape_glob(&self.config.make_key(prefix)));
        let batch_size = self.config.scan_batch_size.max(1);
        debug!("Deleting keys matching '{}'", pattern);

        let mut cursor: u64 = 0;
        let mut deleted = 0usize;

        loop {
            let (next, keys) = self
                .execute_with_retry(|mut conn| {
                    let pattern = pattern.clone();
                    Box::pin(async move {
                        redis::cmd("SCAN")
                            .arg(cursor)
                            .arg("MATCH")
                            .arg(pattern)
                            .arg("COUNT")
                            .arg(batch_size)
                            .query_async::<_, (u64, Vec<String>)>(&mut conn)
                            .await
                    })
                })
                .await
                .map_err(|e| unavailable("scan", &pattern, e))?;

            if !keys.is_empty() {
                let count = self
                    .execute_with_retry(|mut conn| {
                        let keys = keys.clone();
                        Box::pin(async move { conn.del::<_, usize>(keys).await })
                    })
                    .await
                    .map_err(|e| unavailable("delete", &pattern, e))?;
                deleted += count;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!(pattern = %pattern, deleted, "Deleted keys by prefix");
        Ok(deleted)
    }

    fn supports_prefix_delete(&self) -> bool {
        true
    }
}

fn unavailable(operation: &str, key: &str, error: RedisError) -> DomainError {
    error!("Redis {} failed for '{}': {}", operation, key, error);
    DomainError::CacheUnavailable {
        message: format!("Redis {} failed: {}", operation, error),
    }
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask sensitive parts of Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}

/// Escape glob metacharacters so a key prefix matches literally in `SCAN MATCH`
pub(crate) fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
