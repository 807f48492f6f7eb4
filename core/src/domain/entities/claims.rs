//! JWT claim set carried by every issued token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered claims managed by the issuer; caller values for these are discarded
pub const RESERVED_CLAIMS: [&str; 4] = ["jti", "iat", "nbf", "exp"];

/// Claims structure for JWT payload
///
/// Timestamps are unix seconds. They are optional so that foreign tokens
/// missing a registered claim still parse; tokens issued here always carry
/// all of them with `nbf == iat` and `exp == iat + ttl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Token identity id
    pub jti: String,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Scene marker and caller-supplied claims
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl TokenClaims {
    /// Build the claim set for a token issued at `now`
    ///
    /// Reserved claims present in `custom` are dropped.
    pub fn issued(jti: String, now: i64, ttl: i64, mut custom: Map<String, Value>) -> Self {
        strip_reserved(&mut custom);
        Self {
            jti,
            iat: Some(now),
            nbf: Some(now),
            exp: Some(now + ttl),
            custom,
        }
    }

    /// Look up a claim by name, registered claims included
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "jti" => Some(Value::String(self.jti.clone())),
            "iat" => self.iat.map(Value::from),
            "nbf" => self.nbf.map(Value::from),
            "exp" => self.exp.map(Value::from),
            _ => self.custom.get(name).cloned(),
        }
    }

    /// Scene recorded in the token under the given marker claim
    pub fn scene(&self, scene_claim: &str) -> Option<&str> {
        self.custom.get(scene_claim).and_then(Value::as_str)
    }

    /// The claim set a refreshed token is issued from: everything but the
    /// registered identity and time claims
    pub fn into_custom(self) -> Map<String, Value> {
        self.custom
    }
}

/// Remove issuer-managed claims from a caller claim map
pub fn strip_reserved(claims: &mut Map<String, Value>) {
    for name in RESERVED_CLAIMS {
        claims.remove(name);
    }
}

/// Render a principal claim value for use in a token id
///
/// Returns `None` for values that cannot identify a principal: null, false,
/// empty strings and empty collections.
pub fn principal_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
