//! Revocation record stored in the cache, one per token id.

use serde::{Deserialize, Serialize};

/// Cutoff written for a token id on logout, refresh and single-session issuance
///
/// Records are never mutated in place: every write replaces the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    /// Unix timestamp deciding whether tokens with this id are revoked
    pub valid_until: i64,
}

impl RevocationRecord {
    pub fn new(valid_until: i64) -> Self {
        Self { valid_until }
    }

    /// Whether the cutoff is still ahead of `now`
    pub fn is_future(&self, now: i64) -> bool {
        self.valid_until > now
    }
}
