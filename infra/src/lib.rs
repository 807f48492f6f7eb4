//! # Infrastructure Layer
//!
//! Concrete collaborators for the SceneGate token engine.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis-backed and in-process implementations of
//!   [`KeyValueCache`](sg_core::repositories::KeyValueCache)
//! - **Wiring**: [`build_token_manager`] assembles a token manager from
//!   application configuration
//!
//! ## Features
//!
//! - `redis-cache`: Enable the Redis cache backend (default)

// Re-export core types for convenience
pub use sg_core::errors::*;

/// Cache module - Redis client and in-process cache
pub mod cache;

#[cfg(feature = "redis-cache")]
pub use cache::RedisCache;
pub use cache::MemoryCache;

use sg_core::services::{StaticSceneProvider, TokenManager};
use sg_shared::config::AppConfig;

/// Build a token manager backed by Redis from application configuration
///
/// Every scene is validated and its keys loaded before the cache is
/// contacted, so configuration mistakes surface without a live Redis.
#[cfg(feature = "redis-cache")]
pub async fn build_token_manager(
    config: &AppConfig,
) -> Result<TokenManager<RedisCache, StaticSceneProvider>, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing token manager");

    let provider = StaticSceneProvider::from_config(&config.scenes)?;
    let cache = RedisCache::new(config.cache.clone()).await?;

    tracing::info!(
        default_scene = %config.scenes.default_scene,
        scenes = config.scenes.scenes.len(),
        "Token manager initialized"
    );

    Ok(TokenManager::new(provider, cache))
}

/// Build a token manager over an in-process cache
///
/// Revocation records live only as long as the process; suitable for
/// development and single-instance deployments.
pub fn build_in_memory_token_manager(
    config: &AppConfig,
) -> Result<TokenManager<MemoryCache, StaticSceneProvider>, InfrastructureError> {
    let provider = StaticSceneProvider::from_config(&config.scenes)?;
    tracing::info!(
        environment = %config.environment,
        default_scene = %config.scenes.default_scene,
        "Token manager initialized with in-memory cache"
    );
    Ok(TokenManager::new(provider, MemoryCache::new()))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised while assembling domain services
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Domain(e) => e,
            InfrastructureError::Config(message) => DomainError::Configuration { message },
            #[cfg(feature = "redis-cache")]
            other @ InfrastructureError::Cache(_) => DomainError::CacheUnavailable {
                message: other.to_string(),
            },
        }
    }
}
