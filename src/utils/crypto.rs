// Random state tokens and unverified JWT inspection

use crate::errors::ClaimsError;
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;

/// Default number of random bytes in a request state token (192 bits)
pub const DEFAULT_STATE_BYTES: usize = 24;

/// Generate a random state value of `length` bytes, base64url-encoded
///
/// Attached to outgoing authorization requests; the provider echoes it back
/// in the credential so callers can match responses to requests.
#[must_use]
pub fn generate_state_token(length: usize) -> String {
    let mut state = vec![0u8; length];
    rand::rng().fill_bytes(&mut state);
    general_purpose::URL_SAFE_NO_PAD.encode(state)
}

/// Decode a JWT payload without verifying the signature
///
/// For inspecting claims in logs and tests only.
///
/// # Errors
///
/// Returns an error if:
/// - The JWT format is invalid (not 3 parts separated by dots)
/// - Base64 decoding fails
/// - UTF-8 decoding fails
/// - JSON parsing fails
pub fn decode_jwt_payload(token: &str) -> Result<serde_json::Value, ClaimsError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [_, payload_b64, _] = parts.as_slice() else {
        return Err(ClaimsError::Malformed(parts.len()));
    };

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| general_purpose::STANDARD.decode(payload_b64))?;
    let payload_str = String::from_utf8(payload_bytes)?;

    Ok(serde_json::from_str(&payload_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_token_length_and_uniqueness() {
        let a = generate_state_token(DEFAULT_STATE_BYTES);
        let b = generate_state_token(DEFAULT_STATE_BYTES);

        // 24 bytes -> 32 base64url chars, no padding
        assert_eq!(a.len(), 32);
        assert!(!a.contains('='));
        assert_ne!(a, b);
    }

    #[test]
    fn test_state_token_is_url_safe() {
        let token = generate_state_token(64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_decode_jwt_payload_rejects_bad_shapes() {
        assert!(matches!(
            decode_jwt_payload("only.two"),
            Err(ClaimsError::Malformed(2))
        ));
        assert!(matches!(
            decode_jwt_payload("a.!!!.c"),
            Err(ClaimsError::Base64(_))
        ));

        let not_utf8 = general_purpose::URL_SAFE_NO_PAD.encode([0xff, 0xfe]);
        assert!(matches!(
            decode_jwt_payload(&format!("h.{not_utf8}.s")),
            Err(ClaimsError::Utf8(_))
        ));

        let not_json = general_purpose::URL_SAFE_NO_PAD.encode("plain text");
        assert!(matches!(
            decode_jwt_payload(&format!("h.{not_json}.s")),
            Err(ClaimsError::Json(_))
        ));
    }

    #[test]
    fn test_decode_jwt_payload_accepts_padded_payload() {
        let padded = general_purpose::STANDARD.encode(r#"{"aud":"com.example.app"}"#);
        let claims = decode_jwt_payload(&format!("h.{padded}.s")).unwrap();
        assert_eq!(claims["aud"], "com.example.app");
    }
}
