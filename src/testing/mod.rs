//! Testing utilities for apple-login
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built credentials and authorizations
//! - [`mock`] - Scriptable authorization provider
//! - [`assertions`] - Callback recorder and assertion helpers
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use apple_login::testing::{fixtures::TestFixtures, mock::MockAuthorizationProvider, ResultRecorder};
//! use apple_login::SignInCoordinator;
//!
//! let provider = Arc::new(MockAuthorizationProvider::new());
//! let coordinator = SignInCoordinator::new(provider.clone());
//! let recorder = ResultRecorder::new();
//!
//! coordinator.sign_in(recorder.callback());
//! provider.complete_next(TestFixtures::authorization());
//!
//! assert_eq!(recorder.count(), 1);
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use assertions::*;
pub use fixtures::TestFixtures;
pub use mock::{MockAuthorizationProvider, MockResponse};

/// Common test constants
pub mod constants {
    /// Default Apple user identifier
    pub const TEST_USER_ID: &str = "001234.5b6c7d8e9f0a1b2c3d4e5f6a7b8c9d0e.1234";

    /// Default test email address (private relay form)
    pub const TEST_EMAIL: &str = "abc123@privaterelay.appleid.com";

    pub const TEST_GIVEN_NAME: &str = "Jane";
    pub const TEST_FAMILY_NAME: &str = "Appleseed";

    /// Default authorization code
    pub const TEST_AUTHORIZATION_CODE: &str = "c1a2b3c4d5e6f7.0.nrxyz.TestAuthorizationCode";

    /// Audience used in generated identity tokens
    pub const TEST_CLIENT_ID: &str = "com.example.app";
}
