//! # SceneGate Core
//!
//! Token lifecycle engine for multi-scene JWT authentication.
//! This crate contains the claim and revocation entities, the cache
//! abstraction revocation records live in, the revocation rules and the
//! token manager that issues, verifies, refreshes and revokes tokens.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
