//! Token-level error types
//!
//! These errors describe why a single token could not be issued or accepted.
//! Revocation is a distinct kind from signature and expiry failures so that
//! callers can audit the two separately.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Token revoked")]
    Revoked,

    #[error("Missing principal claim: {claim}")]
    MissingPrincipalClaim { claim: String },

    #[error("Token was issued for scene '{actual}', expected '{expected}'")]
    SceneMismatch { expected: String, actual: String },

    #[error("Token generation failed")]
    GenerationFailed,

    #[error("Key loading failed: {message}")]
    KeyLoad { message: String },
}

impl TokenError {
    /// Stable error code for programmatic handling and audit logs
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => "MALFORMED_TOKEN",
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::NotYetValid => "TOKEN_NOT_YET_VALID",
            TokenError::Revoked => "TOKEN_REVOKED",
            TokenError::MissingPrincipalClaim { .. } => "MISSING_PRINCIPAL_CLAIM",
            TokenError::SceneMismatch { .. } => "SCENE_MISMATCH",
            TokenError::GenerationFailed => "TOKEN_GENERATION_FAILED",
            TokenError::KeyLoad { .. } => "KEY_LOAD_ERROR",
        }
    }
}
