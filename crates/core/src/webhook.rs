//! HMAC-SHA256 signatures for payment-processor callbacks.
//!
//! The processor signs the raw request body with the shared
//! `PAYMENT_WEBHOOK_SECRET` and sends the lowercase hex digest in the
//! [`SIGNATURE_HEADER`] header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Request header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail.
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts any key length"),
    }
}

/// Compute the hex-encoded HMAC-SHA256 of `payload`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature` (hex) against `payload` in constant time.
///
/// Malformed hex is treated as a mismatch.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Some(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac = mac_for(secret);
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_64_hex_chars() {
        let sig = compute_signature("secret", br#"{"paymentId":1}"#);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn computed_signature_verifies() {
        let body = br#"{"paymentId":1,"status":"COMPLETED"}"#;
        let sig = compute_signature("secret", body);
        assert!(verify_signature("secret", body, &sig));
    }

    #[test]
    fn upper_case_hex_is_accepted() {
        let body = b"payload";
        let sig = compute_signature("secret", body).to_ascii_uppercase();
        assert!(verify_signature("secret", body, &sig));
    }

    #[test]
    fn tampered_body_fails() {
        let sig = compute_signature("secret", b"amount=25");
        assert!(!verify_signature("secret", b"amount=2500", &sig));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = compute_signature("secret-a", b"payload");
        assert!(!verify_signature("secret-b", b"payload", &sig));
    }

    #[test]
    fn garbage_signature_fails() {
        assert!(!verify_signature("secret", b"payload", "not-hex"));
        assert!(!verify_signature("secret", b"payload", "abc"));
        assert!(!verify_signature("secret", b"payload", ""));
    }
}
