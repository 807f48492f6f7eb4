//! Value objects.

pub mod token_id;

pub use token_id::TokenId;
