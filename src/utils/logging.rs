// Centralized logging for the sign-in flow.
// Tokens and authorization codes are never logged, only whether they are present.
use crate::errors::SignInError;
use crate::models::{LoginResult, Scope};
use log::{debug, info, warn};
use uuid::Uuid;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a request handed to the authorization provider
    pub fn log_request_dispatched(request_id: Uuid, scopes: &[Scope], has_state: bool) {
        let scopes: Vec<String> = scopes.iter().map(ToString::to_string).collect();
        info!(
            "🔄 Dispatching Sign in with Apple request {request_id} (scopes: {}, state: {})",
            scopes.join(" "),
            if has_state { "attached" } else { "none" }
        );
    }

    /// Log a sign-in rejected because another request is outstanding
    pub fn log_request_rejected(pending_id: Uuid) {
        warn!("⏭️  Sign in with Apple request rejected: request {pending_id} still in progress");
    }

    pub fn log_login_success(request_id: Uuid, result: &LoginResult) {
        info!("✅ Sign in with Apple request {request_id} completed");
        debug!(
            "🔍 Credential summary: user={}, email={}, name={}, identity_token={}, authorization_code={}, state={}, real_user_status={:?}",
            result.user_identifier,
            presence(result.email.as_ref()),
            presence(result.full_name.as_ref()),
            presence(result.identity_token.as_ref()),
            presence(result.authorization_code.as_ref()),
            presence(result.state.as_ref()),
            result.real_user_status
        );
    }

    pub fn log_login_failure(request_id: Uuid, error: &SignInError) {
        if error.is_canceled() {
            info!("❌ Sign in with Apple request {request_id} canceled by user");
        } else {
            warn!("❌ Sign in with Apple request {request_id} failed: {error}");
        }
    }

    /// Log a provider notification that matched no pending request
    pub fn log_stale_notification(request_id: Uuid, pending_id: Option<Uuid>) {
        match pending_id {
            Some(pending) => warn!(
                "Ignoring notification for request {request_id}: request {pending} is pending"
            ),
            None => warn!("Ignoring notification for request {request_id}: no request pending"),
        }
    }

    /// Log a handle dropped by the provider without a result
    pub fn log_handle_abandoned(request_id: Uuid) {
        warn!(
            "Authorization handle for request {request_id} dropped without a result; \
             the coordinator stays busy until restart"
        );
    }

    pub fn log_missing_presentation_anchor(request_id: Uuid) {
        warn!("No presentation anchor available for request {request_id}");
    }
}

fn presence<T>(value: Option<&T>) -> &'static str {
    if value.is_some() {
        "present"
    } else {
        "missing"
    }
}
