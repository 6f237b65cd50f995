#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Single-flight coordinator for platform Sign in with Apple requests.
//!
//! The platform authorization provider does the real work; this crate makes
//! sure only one request is outstanding at a time and turns the provider's
//! notification into exactly one `Result<LoginResult, SignInError>` for the
//! caller.

/// Version of the apple-login crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coordinator;
pub mod credential;
pub mod errors;
pub mod models;
pub mod presentation;
pub mod provider;
pub mod settings;
pub mod utils;

// Testing utilities - available for unit tests and when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use coordinator::{normalize_authorization, SignInCallback, SignInCoordinator};
pub use credential::{AppleIdCredential, Authorization, Credential, PasswordCredential};
pub use errors::{
    AuthorizationError, AuthorizationErrorKind, ClaimsError, SettingsError, SignInError,
};
pub use models::{LoginResult, PersonName, RealUserStatus, Scope, REQUESTED_SCOPES};
pub use presentation::{PresentationAnchor, PresentationContextProvider};
pub use provider::{AuthorizationHandle, AuthorizationProvider, AuthorizationRequest};
pub use settings::LoginSettings;
