//! Revocation rules
//!
//! Pure functions deciding cutoffs, record lifetimes and verdicts from a
//! token's claims, its scene configuration and the cached record. No I/O.

use sg_shared::config::{LoginType, SceneConfig};

use crate::domain::entities::{RevocationRecord, TokenClaims};

/// Grace period applied to new cutoffs; always zero for single-session scenes
pub fn grace_period(config: &SceneConfig) -> i64 {
    match config.login_type {
        LoginType::Sso => 0,
        LoginType::Mpop => config.blacklist_grace_period.max(0),
    }
}

/// Cutoff (`valid_until`) for a record written from `claims`
///
/// With `self_expire_shift` the issue time is pushed one second forward so
/// that the token used to revoke a single session is itself rejected. The
/// shift only affects the cutoff, never the claims. Tokens without `iat`
/// are cut off from `now`.
pub fn cutoff(
    claims: &TokenClaims,
    config: &SceneConfig,
    self_expire_shift: bool,
    now: i64,
) -> i64 {
    let shift = if self_expire_shift { 1 } else { 0 };
    claims.iat.unwrap_or(now) + shift + grace_period(config)
}

/// Seconds the record must stay in the cache
///
/// The later of the token's own expiry and `iat + blacklist_cache_ttl`,
/// counted from `now`. May be zero or negative for tokens at or past expiry;
/// the store applies the floor.
pub fn record_ttl(claims: &TokenClaims, config: &SceneConfig, now: i64) -> i64 {
    let iat = claims.iat.unwrap_or(now);
    let retain_until = iat + config.blacklist_cache_ttl;
    let keep_until = match claims.exp {
        Some(exp) => exp.max(retain_until),
        None => retain_until,
    };
    keep_until - now
}

/// Whether a token is revoked given the record stored for its `jti`
pub fn is_revoked(
    claims: &TokenClaims,
    config: &SceneConfig,
    record: Option<&RevocationRecord>,
    now: i64,
) -> bool {
    if !config.blacklist_enabled {
        return false;
    }

    let Some(record) = record else {
        return false;
    };

    match config.login_type {
        // Usable while the grace window is still open
        LoginType::Mpop => !record.is_future(now),
        // Tokens issued before the cutoff are superseded; missing iat fails open
        LoginType::Sso => match claims.iat {
            Some(iat) => iat < record.valid_until,
            None => false,
        },
    }
}
