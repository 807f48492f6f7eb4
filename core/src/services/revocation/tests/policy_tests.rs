//! Unit tests for the revocation rules

use serde_json::Map;
use sg_shared::config::SceneConfig;

use crate::domain::entities::{RevocationRecord, TokenClaims};
use crate::services::revocation::policy::{cutoff, grace_period, is_revoked, record_ttl};

fn claims_at(iat: i64, ttl: i64) -> TokenClaims {
    TokenClaims::issued("scene_jti".to_string(), iat, ttl, Map::new())
}

fn multi_session(grace: i64) -> SceneConfig {
    SceneConfig::with_secret("secret").with_grace_period(grace)
}

fn single_session() -> SceneConfig {
    SceneConfig::with_secret("secret")
        .single_session("uid")
        .with_grace_period(30)
}

#[test]
fn test_grace_period_forced_to_zero_for_single_session() {
    assert_eq!(grace_period(&multi_session(30)), 30);
    assert_eq!(grace_period(&single_session()), 0);
}

#[test]
fn test_cutoff_adds_grace_period() {
    let claims = claims_at(2000, 3600);
    assert_eq!(cutoff(&claims, &multi_session(30), false, 2005), 2030);
}

#[test]
fn test_cutoff_self_expire_shift() {
    let claims = claims_at(1000, 3600);
    assert_eq!(cutoff(&claims, &single_session(), false, 1000), 1000);
    assert_eq!(cutoff(&claims, &single_session(), true, 1000), 1001);
    // The shift never leaks into the claims
    assert_eq!(claims.iat, Some(1000));
}

#[test]
fn test_cutoff_without_iat_uses_now() {
    let mut claims = claims_at(1000, 3600);
    claims.iat = None;
    assert_eq!(cutoff(&claims, &multi_session(10), false, 1500), 1510);
}

#[test]
fn test_record_ttl_outlives_token() {
    let mut config = multi_session(0);
    config.blacklist_cache_ttl = 60;
    // exp (1000 + 3600) is later than iat + 60
    let claims = claims_at(1000, 3600);
    assert_eq!(record_ttl(&claims, &config, 1100), 3500);
}

#[test]
fn test_record_ttl_honours_minimum_retention() {
    let mut config = multi_session(0);
    config.blacklist_cache_ttl = 86400;
    let claims = claims_at(1000, 60);
    assert_eq!(record_ttl(&claims, &config, 1000), 86400);
}

#[test]
fn test_record_ttl_can_be_non_positive() {
    let mut config = multi_session(0);
    config.blacklist_cache_ttl = 0;
    let claims = claims_at(1000, 60);
    assert_eq!(record_ttl(&claims, &config, 1060), 0);
    assert_eq!(record_ttl(&claims, &config, 1100), -40);
}

#[test]
fn test_disabled_blacklist_never_revokes() {
    let mut config = multi_session(0);
    config.blacklist_enabled = false;
    let record = RevocationRecord::new(0);
    assert!(!is_revoked(&claims_at(1000, 60), &config, Some(&record), 5000));
}

#[test]
fn test_no_record_is_not_revoked() {
    assert!(!is_revoked(&claims_at(1000, 60), &multi_session(0), None, 1000));
    assert!(!is_revoked(&claims_at(1000, 60), &single_session(), None, 1000));
}

#[test]
fn test_multi_session_grace_window() {
    let config = multi_session(30);
    let claims = claims_at(2000, 3600);
    let record = RevocationRecord::new(cutoff(&claims, &config, false, 2000));

    assert!(!is_revoked(&claims, &config, Some(&record), 2000));
    assert!(!is_revoked(&claims, &config, Some(&record), 2010));
    assert!(!is_revoked(&claims, &config, Some(&record), 2029));
    assert!(is_revoked(&claims, &config, Some(&record), 2030));
    assert!(is_revoked(&claims, &config, Some(&record), 2031));
}

#[test]
fn test_multi_session_without_grace_revokes_immediately() {
    let config = multi_session(0);
    let claims = claims_at(2000, 3600);
    let record = RevocationRecord::new(cutoff(&claims, &config, false, 2000));
    assert!(is_revoked(&claims, &config, Some(&record), 2000));
}

#[test]
fn test_single_session_rejects_earlier_tokens() {
    let config = single_session();
    let token_a = claims_at(1000, 3600);
    let token_b = claims_at(1005, 3600);
    // Registering B writes B's own iat as the cutoff
    let record = RevocationRecord::new(cutoff(&token_b, &config, false, 1005));

    assert!(is_revoked(&token_a, &config, Some(&record), 1006));
    assert!(!is_revoked(&token_b, &config, Some(&record), 1006));
}

#[test]
fn test_single_session_logout_revokes_own_token() {
    let config = single_session();
    let token = claims_at(1000, 3600);

    let unshifted = RevocationRecord::new(cutoff(&token, &config, false, 1000));
    assert!(!is_revoked(&token, &config, Some(&unshifted), 1000));

    let shifted = RevocationRecord::new(cutoff(&token, &config, true, 1000));
    assert!(is_revoked(&token, &config, Some(&shifted), 1000));
}

#[test]
fn test_single_session_missing_iat_fails_open() {
    let config = single_session();
    let mut claims = claims_at(1000, 3600);
    claims.iat = None;
    let record = RevocationRecord::new(i64::MAX);
    assert!(!is_revoked(&claims, &config, Some(&record), 1000));
}
