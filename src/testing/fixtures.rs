//! Test fixtures providing pre-built credentials
//!
//! Identity tokens produced here are structurally valid JWTs with an
//! unsigned payload, enough for code that only decodes claims.

use crate::credential::{AppleIdCredential, Authorization, Credential, PasswordCredential};
use crate::models::{PersonName, RealUserStatus, Scope};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};

use super::constants::{
    TEST_AUTHORIZATION_CODE, TEST_CLIENT_ID, TEST_EMAIL, TEST_FAMILY_NAME, TEST_GIVEN_NAME,
    TEST_USER_ID,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Identity token for `user` with Apple-shaped claims
    #[must_use]
    pub fn identity_token(user: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","kid":"TEST"}"#);
        let now = Utc::now();
        let payload = serde_json::json!({
            "iss": "https://appleid.apple.com",
            "aud": TEST_CLIENT_ID,
            "sub": user,
            "iat": now.timestamp(),
            "exp": (now + Duration::minutes(10)).timestamp(),
        });
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{payload}.dGVzdF9zaWduYXR1cmU")
    }

    /// First-time authorization: every field populated
    #[must_use]
    pub fn apple_id_credential() -> AppleIdCredential {
        AppleIdCredential {
            user: TEST_USER_ID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            full_name: Some(PersonName::new(Some(TEST_GIVEN_NAME), Some(TEST_FAMILY_NAME))),
            identity_token: Some(Self::identity_token(TEST_USER_ID).into_bytes()),
            authorization_code: Some(TEST_AUTHORIZATION_CODE.as_bytes().to_vec()),
            state: None,
            authorized_scopes: vec![Scope::FullName, Scope::Email],
            real_user_status: RealUserStatus::LikelyReal,
        }
    }

    /// Returning user: Apple no longer shares name or email
    #[must_use]
    pub fn returning_user_credential() -> AppleIdCredential {
        AppleIdCredential {
            email: None,
            full_name: None,
            authorized_scopes: Vec::new(),
            real_user_status: RealUserStatus::Unknown,
            ..Self::apple_id_credential()
        }
    }

    #[must_use]
    pub fn authorization() -> Authorization {
        Self::apple_id_credential().into()
    }

    #[must_use]
    pub fn authorization_without_identity_token() -> Authorization {
        AppleIdCredential {
            identity_token: None,
            ..Self::apple_id_credential()
        }
        .into()
    }

    #[must_use]
    pub fn authorization_with_token_bytes(bytes: &[u8]) -> Authorization {
        AppleIdCredential {
            identity_token: Some(bytes.to_vec()),
            ..Self::apple_id_credential()
        }
        .into()
    }

    #[must_use]
    pub fn authorization_without_code() -> Authorization {
        AppleIdCredential {
            authorization_code: None,
            ..Self::apple_id_credential()
        }
        .into()
    }

    /// Keychain password picked instead of an Apple ID
    #[must_use]
    pub fn password_authorization() -> Authorization {
        Authorization::new(Credential::Password(PasswordCredential {
            user: "jane".to_string(),
            password: "correct horse battery staple".to_string(),
        }))
    }
}
