//! Revocation engine
//!
//! `policy` holds the pure rules deciding cutoffs, record lifetimes and
//! verdicts; `store` persists records over a [`KeyValueCache`].
//!
//! [`KeyValueCache`]: crate::repositories::KeyValueCache

pub mod policy;
mod store;

#[cfg(test)]
pub(crate) mod tests;

pub use store::{RevocationStore, DEFAULT_INDEX_KEY, MIN_RECORD_TTL_SECONDS};
