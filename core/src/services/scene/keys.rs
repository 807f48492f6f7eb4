//! Signing and verification keys compiled from a scene's key material

use std::fs;
use std::path::Path;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use sg_shared::config::{KeyMaterial, SceneConfig};

use crate::errors::{DomainError, TokenError};

/// Key pair for one scene, ready for jsonwebtoken
#[derive(Clone)]
pub struct SceneKeys {
    algorithm: Algorithm,
    /// Key used to sign tokens
    encoding_key: EncodingKey,
    /// Key used to verify tokens
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SceneKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneKeys")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SceneKeys {
    /// Build the keys a scene's algorithm needs
    ///
    /// HMAC algorithms use the shared secret, every other algorithm the PEM
    /// key pair. Inline PEM takes precedence over a key file path.
    pub fn from_config(config: &SceneConfig) -> Result<Self, DomainError> {
        let algorithm: Algorithm = config.algorithm.parse().map_err(|_| {
            DomainError::Configuration {
                message: format!("Unsupported algorithm: {}", config.algorithm),
            }
        })?;

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Self::symmetric_keys(&config.keys)?
            }
            _ => Self::asymmetric_keys(algorithm, &config.keys)?,
        };

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
        })
    }

    fn symmetric_keys(keys: &KeyMaterial) -> Result<(EncodingKey, DecodingKey), DomainError> {
        let secret = keys
            .secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| key_error("HMAC algorithms require a secret".to_string()))?;

        if keys.secret_base64 {
            let encoding_key = EncodingKey::from_base64_secret(secret)
                .map_err(|e| key_error(format!("Invalid base64 secret: {}", e)))?;
            let decoding_key = DecodingKey::from_base64_secret(secret)
                .map_err(|e| key_error(format!("Invalid base64 secret: {}", e)))?;
            Ok((encoding_key, decoding_key))
        } else {
            Ok((
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            ))
        }
    }

    fn asymmetric_keys(
        algorithm: Algorithm,
        keys: &KeyMaterial,
    ) -> Result<(EncodingKey, DecodingKey), DomainError> {
        let private_pem = read_pem(
            "private",
            keys.private_key.as_deref(),
            keys.private_key_path.as_deref(),
        )?;
        let public_pem = read_pem(
            "public",
            keys.public_key.as_deref(),
            keys.public_key_path.as_deref(),
        )?;

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => (
                EncodingKey::from_rsa_pem(&private_pem),
                DecodingKey::from_rsa_pem(&public_pem),
            ),
            Algorithm::ES256 | Algorithm::ES384 => (
                EncodingKey::from_ec_pem(&private_pem),
                DecodingKey::from_ec_pem(&public_pem),
            ),
            Algorithm::EdDSA => (
                EncodingKey::from_ed_pem(&private_pem),
                DecodingKey::from_ed_pem(&public_pem),
            ),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Self::symmetric_keys(keys);
            }
        };

        let encoding_key =
            encoding_key.map_err(|e| key_error(format!("Invalid private key format: {}", e)))?;
        let decoding_key =
            decoding_key.map_err(|e| key_error(format!("Invalid public key format: {}", e)))?;

        Ok((encoding_key, decoding_key))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying JWTs
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

fn read_pem(kind: &str, inline: Option<&str>, path: Option<&Path>) -> Result<Vec<u8>, DomainError> {
    if let Some(pem) = inline {
        return Ok(pem.as_bytes().to_vec());
    }
    match path {
        Some(path) => fs::read(path).map_err(|e| {
            key_error(format!("Failed to read {} key {}: {}", kind, path.display(), e))
        }),
        None => Err(key_error(format!("Missing {} key", kind))),
    }
}

fn key_error(message: String) -> DomainError {
    DomainError::Token(TokenError::KeyLoad { message })
}
