//! Local decoding of the access token's expiry claim.
//!
//! The access token is a signed three-segment structure whose middle segment
//! is base64url-encoded JSON carrying an `exp` unix timestamp. Validity is
//! decided entirely client-side from that claim; no server round-trip. The
//! signature is not verified here -- the server does that on every request.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Decode the `exp` claim of an access token.
///
/// Returns `None` for anything that does not decode cleanly: wrong segment
/// count, invalid base64, invalid JSON, missing claim, out-of-range
/// timestamp. Callers treat `None` as expired (fail closed).
pub fn access_token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claim.exp, 0)
}

/// Whether the token is still valid at `now`.
pub fn token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    match access_token_expiry(token) {
        Some(expiry) => now < expiry,
        None => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    /// Build an unsigned token whose payload carries the given `exp`.
    pub(crate) fn token_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn test_expiry_roundtrip() {
        let now = Utc::now();
        let token = token_with_exp(now.timestamp() + 3600);
        let expiry = access_token_expiry(&token).unwrap();
        assert!(expiry > now);
    }

    #[test]
    fn test_valid_one_second_before_expiry_invalid_after() {
        let now = Utc::now();
        let token = token_with_exp(now.timestamp() + 1);
        assert!(token_valid_at(&token, now));
        assert!(!token_valid_at(&token, now + Duration::seconds(1)));
        assert!(!token_valid_at(&token, now + Duration::seconds(2)));
    }

    #[test]
    fn test_garbage_fails_closed() {
        let now = Utc::now();
        assert!(!token_valid_at("", now));
        assert!(!token_valid_at("not-a-token", now));
        assert!(!token_valid_at("a.b.c", now));
        // Valid base64, invalid JSON
        let bad = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"nope"));
        assert!(!token_valid_at(&bad, now));
        // Valid JSON, no exp claim
        let no_exp = format!("h.{}.s", URL_SAFE_NO_PAD.encode(br#"{"sub":"u1"}"#));
        assert!(!token_valid_at(&no_exp, now));
    }
}
