//! Webhook signature verification.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Headers the gateway may carry the signature in, in lookup order.
pub const SIGNATURE_HEADERS: [&str; 2] = ["wave-signature", "x-webhook-signature"];

/// Returns the first signature header present on the request.
pub fn signature_from_headers(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Hex-encoded HMAC-SHA256 of `payload`, as the gateway computes it.
#[cfg(test)]
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex HMAC-SHA256 signature over the exact body bytes.
///
/// The comparison runs in constant time over the decoded digest. Signatures
/// that are not valid hex never match.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "whsec_test123secret456";

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"event":"collection.completed"}"#;
        let signature = sign(payload, SECRET);
        assert!(verify_signature(payload, &signature, SECRET));
        assert!(verify_signature(payload, &signature.to_uppercase(), SECRET));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"event":"collection.completed"}"#;
        let signature = sign(payload, "wrong_secret");
        assert!(!verify_signature(payload, &signature, SECRET));
    }

    #[test]
    fn modified_payload_is_rejected() {
        let signature = sign(br#"{"event":"collection.completed"}"#, SECRET);
        assert!(!verify_signature(
            br#"{"event":"collection.completed","hacked":true}"#,
            &signature,
            SECRET
        ));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let payload = b"{}";
        assert!(!verify_signature(payload, "not-hex", SECRET));
        assert!(!verify_signature(payload, "", SECRET));
        assert!(!verify_signature(payload, "abcd", SECRET));
    }

    #[test]
    fn header_lookup_prefers_wave_signature() {
        let mut headers = HeaderMap::new();
        headers.insert("x-webhook-signature", HeaderValue::from_static("second"));
        assert_eq!(signature_from_headers(&headers), Some("second"));

        headers.insert("wave-signature", HeaderValue::from_static("first"));
        assert_eq!(signature_from_headers(&headers), Some("first"));

        assert_eq!(signature_from_headers(&HeaderMap::new()), None);
    }
}
