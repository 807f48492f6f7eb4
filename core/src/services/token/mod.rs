//! Token lifecycle
//!
//! - `codec`: JWT signing, parsing and signature/time-bound verification
//! - `manager`: issue, verify, refresh and logout across scenes, backed by
//!   the revocation store

mod codec;
mod manager;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use manager::{IssuedToken, TokenManager, VerifyOptions};
