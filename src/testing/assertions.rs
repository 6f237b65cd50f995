//! Callback recorder and assertion helpers for sign-in results

use crate::errors::SignInError;
use crate::models::LoginResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Collects every result delivered to callbacks it hands out
///
/// Clones share the same storage, so one recorder can observe several
/// `sign_in` calls.
#[derive(Clone, Default)]
pub struct ResultRecorder {
    results: Arc<Mutex<Vec<Result<LoginResult, SignInError>>>>,
}

impl ResultRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn results(&self) -> MutexGuard<'_, Vec<Result<LoginResult, SignInError>>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A callback that appends its result to this recorder
    #[must_use]
    pub fn callback(&self) -> impl FnOnce(Result<LoginResult, SignInError>) + Send + 'static {
        let results = Arc::clone(&self.results);
        move |result| {
            results
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(result);
        }
    }

    /// Number of callback invocations so far
    #[must_use]
    pub fn count(&self) -> usize {
        self.results().len()
    }

    /// Drain all recorded results, oldest first
    #[must_use]
    pub fn take(&self) -> Vec<Result<LoginResult, SignInError>> {
        std::mem::take(&mut *self.results())
    }

    /// Remove and return the single recorded result
    ///
    /// # Panics
    ///
    /// Panics unless exactly one result was recorded.
    #[must_use]
    pub fn take_single(&self) -> Result<LoginResult, SignInError> {
        let mut results = self.take();
        assert_eq!(
            results.len(),
            1,
            "Expected exactly one callback invocation, got {}",
            results.len()
        );
        results.remove(0)
    }
}

/// Assert a successful login for `user_identifier` and return it
///
/// # Panics
///
/// Panics if the result is an error or belongs to another user.
pub fn assert_login_success(
    result: Result<LoginResult, SignInError>,
    user_identifier: &str,
) -> LoginResult {
    match result {
        Ok(login) => {
            assert_eq!(
                login.user_identifier, user_identifier,
                "Login result belongs to the wrong user"
            );
            login
        }
        Err(error) => panic!("Expected successful login, got error: {error}"),
    }
}

/// Assert the overlapping-request rejection
///
/// # Panics
///
/// Panics if the result is anything but `RequestAlreadyInProgress`.
pub fn assert_rejected_in_progress(result: &Result<LoginResult, SignInError>) {
    assert!(
        matches!(result, Err(SignInError::RequestAlreadyInProgress)),
        "Expected RequestAlreadyInProgress, got {result:?}"
    );
}
