//! Cache module
//!
//! Backends for the revocation store: a Redis client with retry logic and
//! SCAN-based prefix deletes, and an in-process cache for development and
//! tests.

pub mod memory_cache;
#[cfg(feature = "redis-cache")]
pub mod redis_cache;


pub use memory_cache::MemoryCache;
#[cfg(feature = "redis-cache")]
pub use redis_cache::RedisCache;

// Re-export commonly used types
pub use sg_shared::config::CacheConfig;
