//! Domain entities.

pub mod claims;
pub mod revocation;

pub use claims::TokenClaims;
pub use revocation::RevocationRecord;
