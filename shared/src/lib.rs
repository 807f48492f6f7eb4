//! Shared configuration and logging for SceneGate
//!
//! This crate provides functionality used across the workspace:
//! - Scene, cache, environment and logging configuration
//! - Tracing subscriber initialization

pub mod config;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, KeyMaterial, LogFormat, LoggingConfig, LoginType,
    SceneConfig, ScenesConfig,
};
pub use logging::init_tracing;
