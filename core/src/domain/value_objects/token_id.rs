//! Token identity (`jti`) derivation.
//!
//! Multi-session tokens get a fresh id per issuance. Single-session tokens
//! get an id that is a pure function of scene and principal, so every token
//! ever issued to the same principal in the same scene shares one id and one
//! revocation record.

use serde_json::{Map, Value};
use sg_shared::config::{LoginType, SceneConfig};
use uuid::Uuid;

use crate::domain::entities::claims::principal_value;
use crate::errors::TokenError;

/// Token identity id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenId(String);

impl TokenId {
    /// Unique id for one multi-session issuance
    pub fn multi_session(scene: &str) -> Self {
        Self(format!("{}_{}", scene, Uuid::new_v4().simple()))
    }

    /// Deterministic id shared by all tokens of one principal in one scene
    ///
    /// `app` + `admin_7` and `app_admin` + `7` give the same id; scene sets
    /// like that are refused when the scene provider is built.
    pub fn single_session(scene: &str, principal: &str) -> Self {
        Self(format!("{}_{}", scene, principal))
    }

    /// Derive the id for a token about to be issued with `claims`
    pub fn derive(
        scene: &str,
        config: &SceneConfig,
        claims: &Map<String, Value>,
    ) -> Result<Self, TokenError> {
        match config.login_type {
            LoginType::Mpop => Ok(Self::multi_session(scene)),
            LoginType::Sso => {
                let principal = claims
                    .get(&config.sso_key)
                    .and_then(principal_value)
                    .ok_or_else(|| TokenError::MissingPrincipalClaim {
                        claim: config.sso_key.clone(),
                    })?;
                Ok(Self::single_session(scene, &principal))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
