//! Token lifecycle: issuance, verification, refresh and logout

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::entities::{RevocationRecord, TokenClaims};
use crate::domain::value_objects::TokenId;
use crate::errors::{DomainError, TokenError};
use crate::repositories::KeyValueCache;
use crate::services::clock::{Clock, SystemClock};
use crate::services::revocation::{policy, RevocationStore};
use crate::services::scene::{Scene, SceneConfigProvider};

use super::codec::TokenCodec;

/// Which checks [`TokenManager::verify`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Verify the signature and the exp/nbf time bounds
    pub check_signature: bool,
    /// Consult the revocation record for the token's id
    pub check_revocation: bool,
    /// Verify against the caller's scene instead of the scene recorded in the
    /// token, rejecting tokens issued by another scene
    pub independent_scene: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            check_signature: true,
            check_revocation: true,
            independent_scene: false,
        }
    }
}

impl VerifyOptions {
    /// Default checks, pinned to the caller's scene
    pub fn independent() -> Self {
        Self {
            independent_scene: true,
            ..Self::default()
        }
    }
}

/// A freshly signed token and the exact claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

impl IssuedToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn jti(&self) -> &str {
        &self.claims.jti
    }
}

impl std::fmt::Display for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token)
    }
}

/// Issues, verifies, refreshes and revokes tokens across scenes
///
/// All collaborators are injected: the scene provider, the cache backing
/// revocation records and the clock. Operations are independent
/// read-compute-write round trips against a single cache key.
pub struct TokenManager<C: KeyValueCache, P: SceneConfigProvider> {
    provider: P,
    store: RevocationStore<C>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl<C: KeyValueCache, P: SceneConfigProvider> TokenManager<C, P> {
    /// Creates a token manager using the system clock
    pub fn new(provider: P, cache: C) -> Self {
        Self::with_clock(provider, cache, Arc::new(SystemClock))
    }

    /// Creates a token manager with an explicit clock
    pub fn with_clock(provider: P, cache: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            store: RevocationStore::new(cache, clock.clone()),
            codec: TokenCodec::new(clock.clone()),
            clock,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &RevocationStore<C> {
        &self.store
    }

    /// Issue a token, registering it as the current session under
    /// single-session login
    pub async fn issue(
        &self,
        scene: Option<&str>,
        claims: Map<String, Value>,
    ) -> Result<IssuedToken, DomainError> {
        self.issue_with(scene, claims, true).await
    }

    /// Issue a token
    ///
    /// With `register_single_session` a single-session scene writes a record
    /// whose cutoff is the new token's own `iat`, invalidating every earlier
    /// token of the same principal while the new one stays valid.
    pub async fn issue_with(
        &self,
        scene: Option<&str>,
        mut claims: Map<String, Value>,
        register_single_session: bool,
    ) -> Result<IssuedToken, DomainError> {
        let scene = self.resolve(scene)?;
        let config = &scene.config;

        let jti = TokenId::derive(&scene.name, config, &claims)?;
        claims.insert(config.scene_claim.clone(), Value::String(scene.name.clone()));

        let now = self.clock.now();
        let claims = TokenClaims::issued(jti.into_string(), now, config.ttl, claims);
        let token = self.codec.build(&claims, &scene)?;

        if config.login_type.is_single_session() && register_single_session {
            self.register(&scene, &claims, false).await?;
        }

        info!(
            scene = %scene.name,
            jti = %claims.jti,
            login_type = %config.login_type,
            "Token issued"
        );

        Ok(IssuedToken { token, claims })
    }

    /// Check a token; success carries no payload
    pub async fn verify(
        &self,
        token: &str,
        scene: Option<&str>,
        options: VerifyOptions,
    ) -> Result<(), DomainError> {
        let claims = self.codec.parse(token)?;
        let scene = self.scene_for(&claims, scene, options.independent_scene)?;

        if options.check_revocation {
            self.ensure_not_revoked(&scene, &claims).await?;
        }

        if options.check_signature {
            self.codec
                .verify_signature_and_time_bounds(token, &scene)
                .map_err(|e| {
                    warn!(scene = %scene.name, jti = %claims.jti, error = %e, "Token rejected");
                    e
                })?;
        }

        Ok(())
    }

    /// Replace a token with a fresh one carrying the same custom claims
    ///
    /// The old token must still verify. A record cut off at the old token's
    /// `iat` is written for its id before the replacement is issued.
    pub async fn refresh(
        &self,
        token: &str,
        scene: Option<&str>,
    ) -> Result<IssuedToken, DomainError> {
        let parsed = self.codec.parse(token)?;
        let scene = self.scene_for(&parsed, scene, false)?;

        self.ensure_not_revoked(&scene, &parsed).await?;
        let claims = self.codec.verify_signature_and_time_bounds(token, &scene)?;

        self.register(&scene, &claims, false).await?;
        let old_jti = claims.jti.clone();

        let issued = self
            .issue_with(Some(scene.name.as_str()), claims.into_custom(), true)
            .await?;

        info!(scene = %scene.name, old_jti = %old_jti, jti = %issued.claims.jti, "Token refreshed");
        Ok(issued)
    }

    /// Revoke the given token
    ///
    /// Under single-session login the cutoff is shifted one second past the
    /// token's `iat`, so the token used to log out is itself rejected.
    /// Logging out twice writes the same record.
    pub async fn logout(&self, token: &str, scene: Option<&str>) -> Result<(), DomainError> {
        let parsed = self.codec.parse(token)?;
        let scene = self.scene_for(&parsed, scene, false)?;
        let claims = self.codec.verify_signature_and_time_bounds(token, &scene)?;

        let self_expire_shift = scene.config.login_type.is_single_session();
        self.register(&scene, &claims, self_expire_shift).await?;

        info!(scene = %scene.name, jti = %claims.jti, "Token logged out");
        Ok(())
    }

    /// Signature-checked claims of a token; revocation is not consulted
    pub async fn claims(
        &self,
        token: &str,
        scene: Option<&str>,
    ) -> Result<TokenClaims, DomainError> {
        let parsed = self.codec.parse(token)?;
        let scene = self.scene_for(&parsed, scene, false)?;
        self.codec.verify_signature_and_time_bounds(token, &scene)
    }

    /// Seconds until the token's own expiry, zero once expired
    pub fn remaining_ttl(&self, token: &str) -> Result<i64, DomainError> {
        let claims = self.codec.parse(token)?;
        let exp = claims
            .exp
            .ok_or(DomainError::Token(TokenError::MalformedToken))?;
        Ok((exp - self.clock.now()).max(0))
    }

    /// Delete the revocation record of one token id
    pub async fn remove_revocation(
        &self,
        scene: Option<&str>,
        jti: &str,
    ) -> Result<bool, DomainError> {
        let scene = self.resolve(scene)?;
        let removed = self.store.delete(&scene.record_key(jti)).await?;
        info!(scene = %scene.name, jti, removed, "Revocation record removed");
        Ok(removed)
    }

    /// Delete every revocation record of a scene
    pub async fn clear_revocations(&self, scene: Option<&str>) -> Result<usize, DomainError> {
        let scene = self.resolve(scene)?;
        let removed = self.store.delete_by_prefix(&scene.record_prefix()).await?;
        info!(scene = %scene.name, removed, "Revocation records cleared");
        Ok(removed)
    }

    /// Write the revocation record for `claims`
    async fn register(
        &self,
        scene: &Scene,
        claims: &TokenClaims,
        self_expire_shift: bool,
    ) -> Result<(), DomainError> {
        let config = &scene.config;
        if !config.blacklist_enabled {
            debug!(scene = %scene.name, "Revocation disabled, no record written");
            return Ok(());
        }

        let now = self.clock.now();
        let record = RevocationRecord::new(policy::cutoff(claims, config, self_expire_shift, now));
        let ttl = policy::record_ttl(claims, config, now);

        self.store
            .put(&scene.record_key(&claims.jti), &record, ttl)
            .await
    }

    async fn ensure_not_revoked(
        &self,
        scene: &Scene,
        claims: &TokenClaims,
    ) -> Result<(), DomainError> {
        if !scene.config.blacklist_enabled {
            return Ok(());
        }

        let record = self.store.get(&scene.record_key(&claims.jti)).await?;
        if policy::is_revoked(claims, &scene.config, record.as_ref(), self.clock.now()) {
            warn!(scene = %scene.name, jti = %claims.jti, "Revoked token presented");
            return Err(DomainError::Token(TokenError::Revoked));
        }

        Ok(())
    }

    fn resolve(&self, scene: Option<&str>) -> Result<Arc<Scene>, DomainError> {
        self.provider
            .resolve(scene.unwrap_or_else(|| self.provider.default_scene()))
    }

    /// Pick the scene whose configuration governs a token
    ///
    /// Normally the scene recorded in the token wins. In independent mode
    /// the caller's scene is used and must match the recorded one.
    fn scene_for(
        &self,
        claims: &TokenClaims,
        scene: Option<&str>,
        independent: bool,
    ) -> Result<Arc<Scene>, DomainError> {
        let caller = self.resolve(scene)?;
        let recorded = claims.scene(&caller.config.scene_claim);

        if independent {
            if recorded != Some(caller.name.as_str()) {
                warn!(
                    expected = %caller.name,
                    actual = recorded.unwrap_or_default(),
                    "Token presented to another scene"
                );
                return Err(DomainError::Token(TokenError::SceneMismatch {
                    expected: caller.name.clone(),
                    actual: recorded.unwrap_or_default().to_string(),
                }));
            }
            return Ok(caller);
        }

        match recorded {
            Some(name) if name != caller.name => self.provider.resolve(name),
            _ => Ok(caller),
        }
    }
}
