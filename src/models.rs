//! Value types handed to sign-in callers

use crate::errors::ClaimsError;
use crate::utils::crypto::decode_jwt_payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scopes that can be requested from the authorization provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    FullName,
    Email,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::FullName => f.write_str("name"),
            Scope::Email => f.write_str("email"),
        }
    }
}

/// Every request asks for exactly these scopes
pub const REQUESTED_SCOPES: [Scope; 2] = [Scope::FullName, Scope::Email];

/// Platform estimate of whether the account belongs to a real person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealUserStatus {
    #[default]
    Unsupported,
    Unknown,
    LikelyReal,
}

/// Structured person name as the platform reports it
///
/// Apple only shares the name on the very first authorization for an app,
/// so every component may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonName {
    pub name_prefix: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
    pub name_suffix: Option<String>,
    pub nickname: Option<String>,
}

impl PersonName {
    #[must_use]
    pub fn new(given_name: Option<&str>, family_name: Option<&str>) -> Self {
        Self {
            given_name: given_name.map(ToString::to_string),
            family_name: family_name.map(ToString::to_string),
            ..Self::default()
        }
    }

    /// True when no component carries any non-blank text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components().next().is_none()
    }

    /// Display form: prefix, given, middle, family, suffix joined by spaces
    ///
    /// Falls back to the nickname when no formal component is present.
    #[must_use]
    pub fn formatted(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.name_prefix,
            &self.given_name,
            &self.middle_name,
            &self.family_name,
            &self.name_suffix,
        ]
        .into_iter()
        .filter_map(|part| non_blank(part.as_deref()))
        .collect();

        if parts.is_empty() {
            non_blank(self.nickname.as_deref()).map(ToString::to_string)
        } else {
            Some(parts.join(" "))
        }
    }

    fn components(&self) -> impl Iterator<Item = &str> {
        [
            &self.name_prefix,
            &self.given_name,
            &self.middle_name,
            &self.family_name,
            &self.name_suffix,
            &self.nickname,
        ]
        .into_iter()
        .filter_map(|part| non_blank(part.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Successful sign-in, built once per flow and handed to the caller
///
/// The coordinator keeps no reference after delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// Stable, provider-assigned opaque user id
    pub user_identifier: String,
    pub email: Option<String>,
    pub full_name: Option<PersonName>,
    /// UTF-8 identity token (a JWT) for server-side verification
    pub identity_token: Option<String>,
    /// Short-lived code for the token endpoint; the provider may omit it
    pub authorization_code: Option<String>,
    /// Anti-replay value echoed back by the provider
    pub state: Option<String>,
    pub authorized_scopes: Vec<Scope>,
    pub real_user_status: RealUserStatus,
    pub authenticated_at: DateTime<Utc>,
}

impl LoginResult {
    /// Display name if the provider shared one
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.full_name.as_ref().and_then(PersonName::formatted)
    }

    /// Decode the identity token payload WITHOUT verifying its signature
    ///
    /// Useful for logging and debugging only. Servers must validate the token
    /// against Apple's published keys before trusting any claim.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no identity token or it is not a
    /// well-formed JWT with a JSON payload.
    pub fn unverified_claims(&self) -> Result<serde_json::Value, ClaimsError> {
        let token = self
            .identity_token
            .as_deref()
            .ok_or(ClaimsError::MissingToken)?;
        decode_jwt_payload(token)
    }
}
