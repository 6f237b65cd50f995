//! Single-flight Sign in with Apple coordinator
//!
//! At most one request is outstanding per coordinator. A second `sign_in`
//! while one is pending is rejected synchronously with
//! [`SignInError::RequestAlreadyInProgress`] and leaves the pending request
//! untouched. Every accepted request ends with exactly one callback, once the
//! provider resolves its [`AuthorizationHandle`]. The coordinator reports
//! busy until that callback has returned, so a `sign_in` issued from inside
//! it is rejected as overlapping.
//!
//! There is no timeout and no cancellation: a provider that never resolves
//! its handle keeps the coordinator busy.

use crate::credential::{Authorization, Credential};
use crate::errors::{AuthorizationError, SignInError};
use crate::models::{LoginResult, REQUESTED_SCOPES};
use crate::presentation::PresentationContextProvider;
use crate::provider::{AuthorizationHandle, AuthorizationProvider, AuthorizationRequest};
use crate::settings::{LoginSettings, RequestSettings};
use crate::utils::crypto::generate_state_token;
use crate::utils::logging::LoggingHelper;
use chrono::{DateTime, Utc};
use scopeguard::defer;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Completion invoked exactly once per `sign_in` call
pub type SignInCallback = Box<dyn FnOnce(Result<LoginResult, SignInError>) + Send + 'static>;

struct PendingRequest {
    id: Uuid,
    /// Taken out when the result is delivered; the slot stays busy until
    /// the callback has returned
    callback: Option<SignInCallback>,
    started_at: DateTime<Utc>,
}

/// Shared request state; the busy flag is `pending.is_some()`
pub(crate) struct CoordinatorCore {
    pending: Mutex<Option<PendingRequest>>,
}

impl CoordinatorCore {
    fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingRequest>> {
        // Callbacks never run under this lock, so a poisoned state is still consistent
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the callback of `request_id` out of the pending slot
    ///
    /// The slot itself is left in place so the coordinator still reads as
    /// busy while the result is computed and delivered.
    fn take_callback(&self, request_id: Uuid) -> Option<(SignInCallback, DateTime<Utc>)> {
        let mut pending = self.lock_pending();
        if let Some(request) = pending.as_mut().filter(|request| request.id == request_id) {
            if let Some(callback) = request.callback.take() {
                return Some((callback, request.started_at));
            }
        }
        let pending_id = pending.as_ref().map(|request| request.id);
        drop(pending);
        LoggingHelper::log_stale_notification(request_id, pending_id);
        None
    }

    /// Return to idle once `request_id` has been delivered
    fn release(&self, request_id: Uuid) {
        let mut pending = self.lock_pending();
        if pending.as_ref().is_some_and(|request| request.id == request_id) {
            *pending = None;
        }
    }

    pub(crate) fn complete_with_authorization(
        &self,
        request_id: Uuid,
        authorization: Authorization,
    ) {
        let Some((callback, started_at)) = self.take_callback(request_id) else {
            return;
        };
        defer! { self.release(request_id); }

        let result = normalize_authorization(authorization);
        match &result {
            Ok(login) => LoggingHelper::log_login_success(request_id, login),
            Err(error) => LoggingHelper::log_login_failure(request_id, error),
        }
        log::debug!(
            "Request {request_id} resolved after {}ms",
            (Utc::now() - started_at).num_milliseconds()
        );
        callback(result);
    }

    pub(crate) fn complete_with_error(&self, request_id: Uuid, error: AuthorizationError) {
        let Some((callback, _)) = self.take_callback(request_id) else {
            return;
        };
        defer! { self.release(request_id); }

        let error = SignInError::Provider(error);
        LoggingHelper::log_login_failure(request_id, &error);
        callback(Err(error));
    }
}

/// Map a provider authorization onto a `LoginResult`
///
/// # Errors
///
/// - `InvalidCredential` when the credential is not an Apple ID credential
/// - `MissingIdentityToken` when no identity token bytes are attached
/// - `TokenDecodeFailed` when the identity token is not UTF-8
///
/// A missing or undecodable authorization code is not an error; the field is
/// left empty.
pub fn normalize_authorization(authorization: Authorization) -> Result<LoginResult, SignInError> {
    let Credential::AppleId(credential) = authorization.credential else {
        return Err(SignInError::InvalidCredential);
    };

    let token_bytes = credential
        .identity_token
        .ok_or(SignInError::MissingIdentityToken)?;
    let identity_token = String::from_utf8(token_bytes).map_err(SignInError::TokenDecodeFailed)?;

    let authorization_code = credential
        .authorization_code
        .and_then(|bytes| String::from_utf8(bytes).ok());

    Ok(LoginResult {
        user_identifier: credential.user,
        email: credential.email,
        full_name: credential.full_name,
        identity_token: Some(identity_token),
        authorization_code,
        state: credential.state,
        authorized_scopes: credential.authorized_scopes,
        real_user_status: credential.real_user_status,
        authenticated_at: Utc::now(),
    })
}

/// Serializes Sign in with Apple requests against one provider
///
/// Construct one per process (or inject it) and share it by cloning; clones
/// share the same in-flight state.
#[derive(Clone)]
pub struct SignInCoordinator {
    core: Arc<CoordinatorCore>,
    provider: Arc<dyn AuthorizationProvider>,
    presentation: Option<Arc<dyn PresentationContextProvider>>,
    request_settings: RequestSettings,
}

impl SignInCoordinator {
    pub fn new(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self {
            core: Arc::new(CoordinatorCore::new()),
            provider,
            presentation: None,
            request_settings: RequestSettings::default(),
        }
    }

    pub fn from_settings(settings: &LoginSettings, provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self::new(provider).with_request_settings(settings.request.clone())
    }

    #[must_use]
    pub fn with_presentation_context(
        mut self,
        presentation: Arc<dyn PresentationContextProvider>,
    ) -> Self {
        self.presentation = Some(presentation);
        self
    }

    #[must_use]
    pub fn with_request_settings(mut self, request_settings: RequestSettings) -> Self {
        self.request_settings = request_settings;
        self
    }

    /// True while a request is outstanding
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.core.lock_pending().is_some()
    }

    /// Id of the outstanding request, if any
    #[must_use]
    pub fn pending_request_id(&self) -> Option<Uuid> {
        self.core.lock_pending().as_ref().map(|request| request.id)
    }

    /// Start a sign-in flow
    ///
    /// If a request is already outstanding, `callback` is invoked right away
    /// with `RequestAlreadyInProgress`. Otherwise the request is handed to the
    /// provider and this returns without waiting; `callback` runs later on
    /// whichever thread the provider resolves its handle from.
    pub fn sign_in<F>(&self, callback: F)
    where
        F: FnOnce(Result<LoginResult, SignInError>) + Send + 'static,
    {
        let request_id = Uuid::new_v4();

        let mut pending = self.core.lock_pending();
        if let Some(pending_id) = pending.as_ref().map(|request| request.id) {
            drop(pending);
            LoggingHelper::log_request_rejected(pending_id);
            callback(Err(SignInError::RequestAlreadyInProgress));
            return;
        }
        *pending = Some(PendingRequest {
            id: request_id,
            callback: Some(Box::new(callback)),
            started_at: Utc::now(),
        });
        drop(pending);

        let request = self.create_request(request_id);
        LoggingHelper::log_request_dispatched(
            request_id,
            &request.requested_scopes,
            request.state.is_some(),
        );

        let handle = AuthorizationHandle::new(request_id, Arc::downgrade(&self.core));
        self.provider.perform_request(request, handle);
    }

    /// Future-based form of [`sign_in`](Self::sign_in)
    ///
    /// The request is dispatched immediately, not on first poll. Resolves to
    /// `Interrupted` if every clone of the coordinator is dropped while the
    /// request is still pending.
    pub fn sign_in_async(
        &self,
    ) -> impl Future<Output = Result<LoginResult, SignInError>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.sign_in(move |result| {
            // Receiver may have been dropped by a caller that lost interest
            let _ = tx.send(result);
        });
        async move { rx.await.unwrap_or(Err(SignInError::Interrupted)) }
    }

    fn create_request(&self, request_id: Uuid) -> AuthorizationRequest {
        let mut request = AuthorizationRequest::new(request_id, &REQUESTED_SCOPES);

        if self.request_settings.attach_state && self.request_settings.state_bytes > 0 {
            request.state = Some(generate_state_token(self.request_settings.state_bytes));
        }

        if let Some(presentation) = &self.presentation {
            request.anchor = presentation.presentation_anchor();
            if request.anchor.is_none() {
                LoggingHelper::log_missing_presentation_anchor(request_id);
            }
        }

        request
    }
}
