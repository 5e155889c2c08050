//! Request authentication for the HTTP surface.
//!
//! Control endpoints carry `?token=<unix seconds>` and are accepted only
//! inside a clock-skew window. Webhook deliveries are optionally verified
//! against `X-Hub-Signature-256` when a secret is configured.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,

    #[error("token is not a unix timestamp")]
    MalformedToken,

    #[error("token is {skew}s away from server time")]
    OutsideWindow { skew: u64 },

    #[error("missing X-Hub-Signature-256 header")]
    MissingSignature,

    #[error("signature must use sha256=<hex> format")]
    MalformedSignature,

    #[error("signature verification failed")]
    BadSignature,
}

/// Accepts tokens that are unix timestamps within `max_skew` seconds of now.
#[derive(Debug, Clone, Copy)]
pub struct TimestampAuth {
    max_skew: u64,
}

impl TimestampAuth {
    pub const fn new(max_skew: u64) -> Self {
        Self { max_skew }
    }

    pub fn verify(&self, token: Option<&str>, now: i64) -> Result<(), AuthError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;
        let stamp: i64 = token.parse().map_err(|_| AuthError::MalformedToken)?;
        let skew = now.abs_diff(stamp);
        if skew > self.max_skew {
            return Err(AuthError::OutsideWindow { skew });
        }
        Ok(())
    }
}

/// Check a GitHub `X-Hub-Signature-256` header over the raw request body.
pub fn verify_signature(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), AuthError> {
    let header = header.ok_or(AuthError::MissingSignature)?;
    let digest = header
        .trim()
        .strip_prefix("sha256=")
        .ok_or(AuthError::MalformedSignature)?;
    let expected = hex::decode(digest).map_err(|_| AuthError::MalformedSignature)?;

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::BadSignature)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| AuthError::BadSignature)
}

/// `sha256=<hex>` signature of `body`, as GitHub would send it.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_inside_window() {
        let auth = TimestampAuth::new(10);
        assert_eq!(auth.verify(Some("1000"), 1000), Ok(()));
        assert_eq!(auth.verify(Some("990"), 1000), Ok(()));
        assert_eq!(auth.verify(Some("1010"), 1000), Ok(()));
    }

    #[test]
    fn test_token_outside_window() {
        let auth = TimestampAuth::new(10);
        assert_eq!(
            auth.verify(Some("989"), 1000),
            Err(AuthError::OutsideWindow { skew: 11 })
        );
        assert_eq!(
            auth.verify(Some("1011"), 1000),
            Err(AuthError::OutsideWindow { skew: 11 })
        );
    }

    #[test]
    fn test_token_missing_or_malformed() {
        let auth = TimestampAuth::new(10);
        assert_eq!(auth.verify(None, 1000), Err(AuthError::MissingToken));
        assert_eq!(auth.verify(Some(" "), 1000), Err(AuthError::MissingToken));
        assert_eq!(auth.verify(Some("soon"), 1000), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_signature_round_trip() {
        let body = br#"{"action":"created"}"#;
        let header = sign("s3cret", body).unwrap();
        assert_eq!(verify_signature("s3cret", body, Some(&header)), Ok(()));
        assert_eq!(
            verify_signature("other", body, Some(&header)),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_signature_header_format() {
        let body = b"{}";
        assert_eq!(verify_signature("s", body, None), Err(AuthError::MissingSignature));
        assert_eq!(
            verify_signature("s", body, Some("sha1=abcd")),
            Err(AuthError::MalformedSignature)
        );
        assert_eq!(
            verify_signature("s", body, Some("sha256=zz")),
            Err(AuthError::MalformedSignature)
        );
    }
}
