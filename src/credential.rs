//! Credential payloads delivered by the authorization provider
//!
//! Providers report raw bytes for the identity token and authorization code,
//! exactly as the platform hands them over. Decoding into strings is the
//! coordinator's job.

use crate::models::{PersonName, RealUserStatus, Scope};
use crate::utils::apple::process_apple_user_info;
use serde_json::Value;

/// A completed authorization, as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub credential: Credential,
}

impl Authorization {
    #[must_use]
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

impl From<AppleIdCredential> for Authorization {
    fn from(credential: AppleIdCredential) -> Self {
        Self::new(Credential::AppleId(credential))
    }
}

/// Credential kinds the platform may return for an authorization
///
/// Only `AppleId` is usable for sign-in; anything else is an invalid credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    AppleId(AppleIdCredential),
    /// Saved keychain password picked instead of Sign in with Apple
    Password(PasswordCredential),
    /// Any other credential type, described by name
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub user: String,
    pub password: String,
}

/// Apple ID credential with the identity token and code still as raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppleIdCredential {
    pub user: String,
    pub email: Option<String>,
    pub full_name: Option<PersonName>,
    pub identity_token: Option<Vec<u8>>,
    pub authorization_code: Option<Vec<u8>>,
    pub state: Option<String>,
    pub authorized_scopes: Vec<Scope>,
    pub real_user_status: RealUserStatus,
}

impl AppleIdCredential {
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_identity_token(mut self, token: impl Into<Vec<u8>>) -> Self {
        self.identity_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_authorization_code(mut self, code: impl Into<Vec<u8>>) -> Self {
        self.authorization_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_full_name(mut self, name: PersonName) -> Self {
        self.full_name = Some(name);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Build a credential from Apple's web `form_post` callback
    ///
    /// The web flow posts `code`, `id_token`, `state` and, on first
    /// authorization only, a `user` JSON blob with name and email. The user
    /// identifier comes from the caller, typically the `sub` claim of the
    /// identity token.
    #[must_use]
    pub fn from_web_callback(
        user: impl Into<String>,
        code: Option<&str>,
        id_token: Option<&str>,
        state: Option<&str>,
        user_json: Option<&Value>,
    ) -> Self {
        let user_info = user_json.and_then(process_apple_user_info);
        let (email, full_name) = match user_info {
            Some(info) => {
                let name = info.person_name();
                (info.email, name)
            }
            None => (None, None),
        };

        Self {
            user: user.into(),
            email,
            full_name,
            identity_token: id_token.map(|token| token.as_bytes().to_vec()),
            authorization_code: code.map(|code| code.as_bytes().to_vec()),
            state: state.map(ToString::to_string),
            authorized_scopes: Vec::new(),
            real_user_status: RealUserStatus::Unsupported,
        }
    }
}
