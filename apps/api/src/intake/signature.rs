use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::warn;

type HmacSha1 = Hmac<Sha1>;

/// Outcome of checking a delivery's signature header against the shared
/// secret. `Skipped` is open mode: no secret configured for this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid,
    Skipped,
}

/// Verifies the sender's HMAC-SHA1 hex digest over the exact raw body bytes.
///
/// The header may carry an algorithm prefix (`sha1=<hex>`), which is stripped
/// before comparison. Comparison runs in constant time via `Mac::verify_slice`
/// so the check leaks nothing about where a forged digest first diverges.
///
/// With no secret configured, verification is skipped entirely and a warning
/// is logged; with a secret configured, a missing or malformed header is a
/// hard rejection.
pub fn verify(body: &[u8], signature_header: Option<&str>, secret: Option<&str>) -> SignatureCheck {
    let secret = match secret {
        Some(s) => s,
        None => {
            warn!("No webhook secret configured; accepting delivery unverified");
            return SignatureCheck::Skipped;
        }
    };

    let header = match signature_header {
        Some(h) => h.trim(),
        None => return SignatureCheck::Invalid,
    };
    let hex_digest = header.strip_prefix("sha1=").unwrap_or(header);

    let expected = match hex::decode(hex_digest) {
        Ok(bytes) => bytes,
        Err(_) => return SignatureCheck::Invalid,
    };

    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return SignatureCheck::Invalid,
    };
    mac.update(body);

    match mac.verify_slice(&expected) {
        Ok(()) => SignatureCheck::Valid,
        Err(_) => SignatureCheck::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "shhh-tires";

    /// Hex digest the sender would supply for this body.
    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac =
            HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_with_prefix() {
        let body = br#"{"delivery_id":"d1"}"#;
        let header = format!("sha1={}", sign(body, SECRET));
        assert_eq!(
            verify(body, Some(&header), Some(SECRET)),
            SignatureCheck::Valid
        );
    }

    #[test]
    fn test_valid_signature_without_prefix() {
        let body = b"payload";
        let header = sign(body, SECRET);
        assert_eq!(
            verify(body, Some(&header), Some(SECRET)),
            SignatureCheck::Valid
        );
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let header = format!("sha1={}", sign(b"original", SECRET));
        assert_eq!(
            verify(b"tampered", Some(&header), Some(SECRET)),
            SignatureCheck::Invalid
        );
    }

    #[test]
    fn test_missing_header_is_rejected_when_secret_configured() {
        assert_eq!(verify(b"body", None, Some(SECRET)), SignatureCheck::Invalid);
    }

    #[test]
    fn test_garbage_header_is_rejected() {
        assert_eq!(
            verify(b"body", Some("sha1=not-hex"), Some(SECRET)),
            SignatureCheck::Invalid
        );
    }

    #[test]
    fn test_open_mode_accepts_anything() {
        assert_eq!(verify(b"body", None, None), SignatureCheck::Skipped);
        assert_eq!(
            verify(b"body", Some("sha1=deadbeef"), None),
            SignatureCheck::Skipped
        );
    }
}
