//! Domain-specific error types and error handling.

mod types;

pub use types::TokenError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown scene: {scene}")]
    UnknownScene { scene: String },

    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to token errors
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Stable error code for programmatic handling and audit logs
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::UnknownScene { .. } => "UNKNOWN_SCENE",
            DomainError::CacheUnavailable { .. } => "CACHE_UNAVAILABLE",
            DomainError::Unsupported { .. } => "UNSUPPORTED_OPERATION",
            DomainError::Configuration { .. } => "CONFIGURATION_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Token(err) => err.code(),
        }
    }

    /// Whether the failure is a revocation verdict
    pub fn is_revoked(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::Revoked))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
