//! JWT encoding and decoding over jsonwebtoken

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, Header, Validation};

use crate::domain::entities::TokenClaims;
use crate::errors::{DomainError, TokenError};
use crate::services::clock::Clock;
use crate::services::scene::Scene;

/// Signs, parses and verifies tokens for a scene
///
/// Expiry and not-before are checked against the injected [`Clock`] rather
/// than jsonwebtoken's wall clock, honouring the scene's `leeway`.
#[derive(Clone)]
pub struct TokenCodec {
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Sign `claims` with the scene's key
    pub fn build(&self, claims: &TokenClaims, scene: &Scene) -> Result<String, DomainError> {
        let header = Header::new(scene.keys.algorithm());
        encode(&header, claims, scene.keys.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    /// Decode claims without checking the signature or time bounds
    pub fn parse(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let mut validation = claims_only_validation(Algorithm::HS256);
        validation.insecure_disable_signature_validation();

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::Token(TokenError::MalformedToken))
    }

    /// Verify the signature with the scene's key, then exp and nbf
    pub fn verify_signature_and_time_bounds(
        &self,
        token: &str,
        scene: &Scene,
    ) -> Result<TokenClaims, DomainError> {
        let validation = claims_only_validation(scene.keys.algorithm());

        let claims = decode::<TokenClaims>(token, scene.keys.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::InvalidKeyFormat => DomainError::Token(TokenError::InvalidSignature),
                _ => DomainError::Token(TokenError::MalformedToken),
            })?;

        self.check_time_bounds(&claims, scene.config.leeway)?;
        Ok(claims)
    }

    fn check_time_bounds(&self, claims: &TokenClaims, leeway: i64) -> Result<(), DomainError> {
        let now = self.clock.now();
        let leeway = leeway.max(0);

        let exp = claims
            .exp
            .ok_or(DomainError::Token(TokenError::MalformedToken))?;
        if now >= exp + leeway {
            return Err(DomainError::Token(TokenError::Expired));
        }

        if let Some(nbf) = claims.nbf {
            if now < nbf - leeway {
                return Err(DomainError::Token(TokenError::NotYetValid));
            }
        }

        Ok(())
    }
}

/// Validation that only checks the signature; time bounds are handled by
/// the codec against its own clock
fn claims_only_validation(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}
