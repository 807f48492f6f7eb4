//! Domain layer containing token entities and value objects.

pub mod entities;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::{RevocationRecord, TokenClaims};
pub use value_objects::TokenId;
