//! Scriptable authorization provider for testing
//!
//! Requests either resolve immediately from a queued `MockResponse` or are
//! parked until the test resolves them, mimicking the out-of-process delay of
//! the real platform sheet.

use crate::credential::Authorization;
use crate::errors::AuthorizationError;
use crate::provider::{AuthorizationHandle, AuthorizationProvider, AuthorizationRequest};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What the mock does with the next request it receives
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Keep the handle until the test resolves it
    Park,
    /// Resolve synchronously inside `perform_request`
    Complete(Authorization),
    /// Fail synchronously inside `perform_request`
    Fail(AuthorizationError),
}

/// Records every request; parks handles unless a response is queued
#[derive(Default)]
pub struct MockAuthorizationProvider {
    requests: Mutex<Vec<AuthorizationRequest>>,
    parked: Mutex<VecDeque<AuthorizationHandle>>,
    script: Mutex<VecDeque<MockResponse>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAuthorizationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a future request (first in, first out)
    pub fn respond_with(&self, response: MockResponse) {
        lock(&self.script).push_back(response);
    }

    /// Number of requests the coordinator dispatched
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        lock(&self.requests).clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<AuthorizationRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Number of handles waiting to be resolved
    #[must_use]
    pub fn parked_count(&self) -> usize {
        lock(&self.parked).len()
    }

    /// Remove the oldest parked handle
    #[must_use]
    pub fn take_handle(&self) -> Option<AuthorizationHandle> {
        lock(&self.parked).pop_front()
    }

    /// Resolve the oldest parked request with `authorization`
    ///
    /// Returns false when nothing was parked.
    pub fn complete_next(&self, authorization: Authorization) -> bool {
        match self.take_handle() {
            Some(handle) => {
                handle.complete(authorization);
                true
            }
            None => false,
        }
    }

    /// Fail the oldest parked request with `error`
    ///
    /// Returns false when nothing was parked.
    pub fn fail_next(&self, error: AuthorizationError) -> bool {
        match self.take_handle() {
            Some(handle) => {
                handle.fail(error);
                true
            }
            None => false,
        }
    }
}

impl AuthorizationProvider for MockAuthorizationProvider {
    fn perform_request(&self, request: AuthorizationRequest, handle: AuthorizationHandle) {
        lock(&self.requests).push(request);
        let response = lock(&self.script).pop_front().unwrap_or(MockResponse::Park);

        // No lock may be held here: resolving runs the caller's callback,
        // which is free to start the next sign-in
        match response {
            MockResponse::Park => lock(&self.parked).push_back(handle),
            MockResponse::Complete(authorization) => handle.complete(authorization),
            MockResponse::Fail(error) => handle.fail(error),
        }
    }
}
