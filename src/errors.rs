//! Error types for the sign-in flow
//!
//! `SignInError` is the single terminal error a sign-in callback can receive.
//! Failures reported by the platform authorization provider are carried
//! through unchanged in [`SignInError::Provider`].

use std::fmt;
use thiserror::Error;

/// Terminal outcome of a failed sign-in request
///
/// None of these are retried automatically. A fresh call to
/// `SignInCoordinator::sign_in` is the only retry mechanism.
#[derive(Debug, Error)]
pub enum SignInError {
    /// The provider returned a credential that is not an Apple ID credential
    #[error("invalid sign-in credential")]
    InvalidCredential,

    /// The Apple ID credential carried no identity token
    #[error("credential has no identity token")]
    MissingIdentityToken,

    /// The identity token bytes are not valid UTF-8
    #[error("identity token could not be decoded as UTF-8: {0}")]
    TokenDecodeFailed(#[source] std::string::FromUtf8Error),

    /// Another sign-in request is still outstanding
    #[error("a sign-in request is already in progress")]
    RequestAlreadyInProgress,

    /// The platform flow itself failed (cancellation, network, ...)
    #[error(transparent)]
    Provider(#[from] AuthorizationError),

    /// The coordinator went away while the request was still pending
    #[error("sign-in request was interrupted before completing")]
    Interrupted,
}

impl SignInError {
    /// Whether the caller may simply try again later
    ///
    /// Only a rejected overlapping request is locally recoverable; everything
    /// else needs a brand new flow initiated by the user.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, SignInError::RequestAlreadyInProgress)
    }

    /// Whether the user dismissed the system sign-in sheet
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            SignInError::Provider(AuthorizationError {
                kind: AuthorizationErrorKind::Canceled,
                ..
            })
        )
    }
}

/// Error codes the platform authorization service reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationErrorKind {
    Unknown,
    Canceled,
    InvalidResponse,
    NotHandled,
    Failed,
    NotInteractive,
}

impl fmt::Display for AuthorizationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthorizationErrorKind::Unknown => "unknown",
            AuthorizationErrorKind::Canceled => "canceled",
            AuthorizationErrorKind::InvalidResponse => "invalid response",
            AuthorizationErrorKind::NotHandled => "not handled",
            AuthorizationErrorKind::Failed => "failed",
            AuthorizationErrorKind::NotInteractive => "not interactive",
        };
        f.write_str(name)
    }
}

/// Failure reported by the authorization provider
///
/// Opaque to the coordinator: it is handed to the caller exactly as the
/// provider produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authorization {kind}: {message}")]
pub struct AuthorizationError {
    pub kind: AuthorizationErrorKind,
    pub message: String,
}

impl AuthorizationError {
    #[must_use]
    pub fn new(kind: AuthorizationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The user dismissed the sign-in sheet
    #[must_use]
    pub fn canceled() -> Self {
        Self::new(
            AuthorizationErrorKind::Canceled,
            "the user canceled the authorization attempt",
        )
    }
}

/// Errors from decoding identity token claims without verification
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("no identity token present")]
    MissingToken,

    #[error("invalid JWT format: expected 3 dot-separated parts, got {0}")]
    Malformed(usize),

    #[error("JWT payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JWT payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JWT payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading `LoginSettings`
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: basic_toml::Error,
    },

    #[error("invalid settings in {path}: {message}")]
    Invalid { path: String, message: String },
}
