//! Seam to the platform authorization provider
//!
//! The provider owns everything that happens out of process: presenting the
//! system sheet, talking to Apple, verifying the user. It receives one
//! `AuthorizationRequest` together with a one-shot `AuthorizationHandle` and
//! reports back by consuming the handle exactly once.

use crate::coordinator::CoordinatorCore;
use crate::credential::Authorization;
use crate::errors::AuthorizationError;
use crate::models::Scope;
use crate::presentation::PresentationAnchor;
use crate::utils::logging::LoggingHelper;
use std::sync::Weak;
use uuid::Uuid;

/// A single request for Apple ID credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub id: Uuid,
    pub requested_scopes: Vec<Scope>,
    /// Echoed back in the credential's `state`
    pub state: Option<String>,
    pub anchor: Option<PresentationAnchor>,
}

impl AuthorizationRequest {
    #[must_use]
    pub fn new(id: Uuid, scopes: &[Scope]) -> Self {
        Self {
            id,
            requested_scopes: scopes.to_vec(),
            state: None,
            anchor: None,
        }
    }
}

/// Platform service that performs authorization requests
///
/// `perform_request` must not block: it starts the flow and returns. The
/// outcome is reported later, from any thread, through `handle`.
pub trait AuthorizationProvider: Send + Sync {
    fn perform_request(&self, request: AuthorizationRequest, handle: AuthorizationHandle);
}

/// One-shot responder for a dispatched request
///
/// Both `complete` and `fail` consume the handle, so a request can be
/// resolved at most once. Dropping the handle unresolved leaves the
/// coordinator busy; there is no timeout.
#[derive(Debug)]
pub struct AuthorizationHandle {
    request_id: Uuid,
    core: Option<Weak<CoordinatorCore>>,
}

impl AuthorizationHandle {
    pub(crate) fn new(request_id: Uuid, core: Weak<CoordinatorCore>) -> Self {
        Self {
            request_id,
            core: Some(core),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Report a completed authorization
    pub fn complete(mut self, authorization: Authorization) {
        if let Some(core) = self.take_core() {
            core.complete_with_authorization(self.request_id, authorization);
        }
    }

    /// Report that the platform flow failed
    pub fn fail(mut self, error: AuthorizationError) {
        if let Some(core) = self.take_core() {
            core.complete_with_error(self.request_id, error);
        }
    }

    fn take_core(&mut self) -> Option<std::sync::Arc<CoordinatorCore>> {
        let core = self.core.take()?.upgrade();
        if core.is_none() {
            log::debug!(
                "Coordinator for request {} is gone, dropping notification",
                self.request_id
            );
        }
        core
    }
}

impl Drop for AuthorizationHandle {
    fn drop(&mut self) {
        if self.core.is_some() {
            LoggingHelper::log_handle_abandoned(self.request_id);
        }
    }
}
