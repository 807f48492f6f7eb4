//! Per-scene token configuration
//!
//! A scene is a named tenant/application context. Each scene carries its own
//! signing algorithm, key material, token lifetime, login topology and
//! revocation settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Login topology of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    /// Multi-session login: many concurrent tokens per principal, revoked individually
    Mpop,
    /// Single-session login: only the most recently issued token per principal is valid
    Sso,
}

impl LoginType {
    pub fn is_single_session(&self) -> bool {
        matches!(self, LoginType::Sso)
    }
}

impl Default for LoginType {
    fn default() -> Self {
        LoginType::Mpop
    }
}

impl std::fmt::Display for LoginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginType::Mpop => write!(f, "mpop"),
            LoginType::Sso => write!(f, "sso"),
        }
    }
}

/// Signing key material for a scene
///
/// HMAC algorithms read `secret`; asymmetric algorithms read the PEM pair,
/// either inline or from files. Inline PEM wins over a path.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct KeyMaterial {
    /// Shared secret for HS* algorithms
    #[serde(default)]
    pub secret: Option<String>,

    /// Whether `secret` is base64 encoded
    #[serde(default)]
    pub secret_base64: bool,

    /// PEM-encoded private key
    #[serde(default)]
    pub private_key: Option<String>,

    /// PEM-encoded public key
    #[serde(default)]
    pub public_key: Option<String>,

    /// Path to a PEM-encoded private key
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Path to a PEM-encoded public key
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,
}

impl KeyMaterial {
    /// Key material for an HMAC scene
    pub fn secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    /// Key material for an asymmetric scene from inline PEM strings
    pub fn pem_pair(private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            public_key: Some(public_key.into()),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("secret_base64", &self.secret_base64)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key.is_some())
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .finish()
    }
}

/// Configuration of a single scene
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    /// JWT algorithm name (HS256, RS256, ES256, EdDSA, ...)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Signing key material
    #[serde(default)]
    pub keys: KeyMaterial,

    /// Token lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl: i64,

    /// Login topology
    #[serde(default)]
    pub login_type: LoginType,

    /// Name of the principal claim used to derive single-session token ids
    #[serde(default = "default_sso_key")]
    pub sso_key: String,

    /// Whether revocation records are written and checked
    #[serde(default = "default_blacklist_enabled")]
    pub blacklist_enabled: bool,

    /// Minimum retention of a revocation record, counted from the token's issue time
    #[serde(default = "default_blacklist_cache_ttl")]
    pub blacklist_cache_ttl: i64,

    /// Seconds a logged-out multi-session token stays usable
    #[serde(default)]
    pub blacklist_grace_period: i64,

    /// Cache key prefix for revocation records
    #[serde(default = "default_blacklist_prefix")]
    pub blacklist_prefix: String,

    /// Authorization header scheme expected in front of the token
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,

    /// Claim that records which scene issued a token
    #[serde(default = "default_scene_claim")]
    pub scene_claim: String,

    /// Clock skew tolerance in seconds applied to exp/nbf checks
    #[serde(default)]
    pub leeway: i64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            keys: KeyMaterial::default(),
            ttl: default_ttl(),
            login_type: LoginType::default(),
            sso_key: default_sso_key(),
            blacklist_enabled: default_blacklist_enabled(),
            blacklist_cache_ttl: default_blacklist_cache_ttl(),
            blacklist_grace_period: 0,
            blacklist_prefix: default_blacklist_prefix(),
            token_prefix: default_token_prefix(),
            scene_claim: default_scene_claim(),
            leeway: 0,
        }
    }
}

impl SceneConfig {
    /// Create an HMAC scene with the given secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            keys: KeyMaterial::secret(secret),
            ..Default::default()
        }
    }

    /// Switch the scene to single-session login keyed on `claim`
    pub fn single_session(mut self, claim: impl Into<String>) -> Self {
        self.login_type = LoginType::Sso;
        self.sso_key = claim.into();
        self
    }

    /// Set the grace period for multi-session logout
    pub fn with_grace_period(mut self, seconds: i64) -> Self {
        self.blacklist_grace_period = seconds;
        self
    }

    /// Set the token lifetime
    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.ttl = seconds;
        self
    }
}

/// All configured scenes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenesConfig {
    /// Scene used when a caller does not name one
    #[serde(default = "default_scene_name")]
    pub default_scene: String,

    /// Scene configurations keyed by scene name
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneConfig>,
}

impl Default for ScenesConfig {
    fn default() -> Self {
        Self {
            default_scene: default_scene_name(),
            scenes: BTreeMap::new(),
        }
    }
}

impl ScenesConfig {
    /// Add or replace a scene
    pub fn with_scene(mut self, name: impl Into<String>, scene: SceneConfig) -> Self {
        self.scenes.insert(name.into(), scene);
        self
    }

    /// Set the default scene name
    pub fn with_default_scene(mut self, name: impl Into<String>) -> Self {
        self.default_scene = name.into();
        self
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_ttl() -> i64 {
    7200 // 2 hours
}

fn default_sso_key() -> String {
    String::from("uid")
}

fn default_blacklist_enabled() -> bool {
    true
}

fn default_blacklist_cache_ttl() -> i64 {
    86400 // 1 day
}

fn default_blacklist_prefix() -> String {
    String::from("scenegate_jwt")
}

fn default_token_prefix() -> String {
    String::from("Bearer")
}

fn default_scene_claim() -> String {
    String::from("jwt_scene")
}

fn default_scene_name() -> String {
    String::from("default")
}
