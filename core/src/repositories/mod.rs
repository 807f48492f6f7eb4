//! Repository interfaces for external storage.

pub mod cache;

pub use cache::KeyValueCache;
