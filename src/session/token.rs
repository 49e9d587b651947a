use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::utils::TokenError;

/// Claims read from the payload segment of a bearer token
///
/// The signature is never checked here; the server stays the authority on
/// validity. Claims are only used to spot a stale session before any
/// request goes out.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    /// Expiry in seconds since the Unix epoch
    pub exp: i64,
    pub iat: Option<i64>,
    pub sub: Option<String>,
    pub id: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// True when the expiry instant is strictly before `now`, to the millisecond
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.saturating_mul(1000) < now.timestamp_millis()
    }
}

/// Decode the claims of a three-segment token
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::Segments(segments.len()));
    }

    // Accept the standard alphabet and padding as well as base64url
    let normalized: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| TokenError::Encoding(e.to_string()))?;
    let payload: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    let exp = payload
        .get("exp")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .ok_or(TokenError::MissingExpiry)?;

    Ok(TokenClaims {
        exp,
        iat: payload.get("iat").and_then(Value::as_i64),
        sub: payload.get("sub").and_then(Value::as_str).map(str::to_string),
        id: claim_id(&payload),
    })
}

// Backends nest the identity either at the top level or under `user`
fn claim_id(payload: &Value) -> Option<String> {
    let raw = payload
        .get("id")
        .or_else(|| payload.pointer("/user/id"))?;
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn make_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}
