// End-to-end behaviour of the single-flight coordinator against the mock provider
use apple_login::testing::constants::{TEST_AUTHORIZATION_CODE, TEST_EMAIL, TEST_USER_ID};
use apple_login::testing::{
    assert_login_success, assert_rejected_in_progress, MockAuthorizationProvider, MockResponse,
    ResultRecorder, TestFixtures,
};
use apple_login::{
    AppleIdCredential, AuthorizationError, AuthorizationErrorKind, RealUserStatus, Scope,
    SignInCoordinator, SignInError,
};
use std::sync::Arc;
use std::thread;

fn setup() -> (SignInCoordinator, Arc<MockAuthorizationProvider>) {
    let provider = Arc::new(MockAuthorizationProvider::new());
    (SignInCoordinator::new(provider.clone()), provider)
}

#[test]
fn test_success_without_authorization_code() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(recorder.callback());
    assert_eq!(recorder.count(), 0, "sign_in must not wait for the provider");

    assert!(provider.complete_next(AppleIdCredential::new("u1").with_identity_token("tok1").into()));

    let login = assert_login_success(recorder.take_single(), "u1");
    assert_eq!(login.identity_token.as_deref(), Some("tok1"));
    assert_eq!(login.authorization_code, None);
    assert!(!coordinator.is_busy());
}

#[test]
fn test_first_authorization_carries_all_fields() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(recorder.callback());
    provider.complete_next(TestFixtures::authorization());

    let login = assert_login_success(recorder.take_single(), TEST_USER_ID);
    assert_eq!(login.email.as_deref(), Some(TEST_EMAIL));
    assert_eq!(login.display_name().as_deref(), Some("Jane Appleseed"));
    assert_eq!(login.authorization_code.as_deref(), Some(TEST_AUTHORIZATION_CODE));
    assert_eq!(login.authorized_scopes, vec![Scope::FullName, Scope::Email]);
    assert_eq!(login.real_user_status, RealUserStatus::LikelyReal);

    let claims = login.unverified_claims().unwrap();
    assert_eq!(claims["sub"], TEST_USER_ID);
    assert_eq!(claims["iss"], "https://appleid.apple.com");
}

#[test]
fn test_returning_user_has_no_profile() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(recorder.callback());
    provider.complete_next(TestFixtures::returning_user_credential().into());

    let login = assert_login_success(recorder.take_single(), TEST_USER_ID);
    assert!(login.email.is_none());
    assert!(login.full_name.is_none());
    assert!(login.identity_token.is_some());
}

#[test]
fn test_overlapping_request_then_provider_failure() {
    let (coordinator, provider) = setup();
    let first = ResultRecorder::new();
    let second = ResultRecorder::new();

    coordinator.sign_in(first.callback());
    coordinator.sign_in(second.callback());

    // Rejection is synchronous and does not touch the first request
    assert_rejected_in_progress(&second.take_single());
    assert_eq!(first.count(), 0);
    assert_eq!(provider.request_count(), 1);
    assert!(coordinator.is_busy());

    provider.fail_next(AuthorizationError::canceled());

    match first.take_single() {
        Err(error) => assert!(error.is_canceled()),
        Ok(login) => panic!("unexpected success: {login:?}"),
    }
    assert!(!coordinator.is_busy());
}

#[test]
fn test_idle_again_after_every_terminal_path() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    provider.respond_with(MockResponse::Complete(TestFixtures::authorization()));
    provider.respond_with(MockResponse::Fail(AuthorizationError::new(
        AuthorizationErrorKind::Failed,
        "network unreachable",
    )));
    provider.respond_with(MockResponse::Complete(TestFixtures::password_authorization()));
    provider.respond_with(MockResponse::Complete(
        TestFixtures::authorization_without_identity_token(),
    ));
    provider.respond_with(MockResponse::Complete(
        TestFixtures::authorization_with_token_bytes(&[0xf0, 0x28, 0x8c, 0x28]),
    ));

    for _ in 0..5 {
        coordinator.sign_in(recorder.callback());
        assert!(!coordinator.is_busy());
    }

    let results = recorder.take();
    assert_eq!(results.len(), 5);
    assert!(results[0].is_ok());
    assert!(matches!(
        &results[1],
        Err(SignInError::Provider(AuthorizationError {
            kind: AuthorizationErrorKind::Failed,
            ..
        }))
    ));
    assert!(matches!(results[2], Err(SignInError::InvalidCredential)));
    assert!(matches!(results[3], Err(SignInError::MissingIdentityToken)));
    assert!(matches!(results[4], Err(SignInError::TokenDecodeFailed(_))));
    assert_eq!(provider.request_count(), 5);
}

#[test]
fn test_missing_code_is_not_an_error() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(recorder.callback());
    provider.complete_next(TestFixtures::authorization_without_code());

    let login = assert_login_success(recorder.take_single(), TEST_USER_ID);
    assert_eq!(login.authorization_code, None);
}

#[test]
fn test_each_request_gets_fresh_state() {
    let (coordinator, provider) = setup();

    for _ in 0..2 {
        coordinator.sign_in(|_| {});
        provider.fail_next(AuthorizationError::canceled());
    }

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].id, requests[1].id);
    assert!(requests[0].state.is_some());
    assert_ne!(requests[0].state, requests[1].state);
}

#[test]
fn test_state_echoed_back_in_result() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(recorder.callback());
    let state = provider.last_request().and_then(|request| request.state);
    let credential = AppleIdCredential {
        state: state.clone(),
        ..TestFixtures::apple_id_credential()
    };
    provider.complete_next(credential.into());

    let login = assert_login_success(recorder.take_single(), TEST_USER_ID);
    assert_eq!(login.state, state);
}

#[test]
fn test_resolved_from_another_thread() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(recorder.callback());
    let handle = provider.take_handle().unwrap();

    thread::spawn(move || handle.complete(TestFixtures::authorization()))
        .join()
        .unwrap();

    assert_login_success(recorder.take_single(), TEST_USER_ID);
    assert!(!coordinator.is_busy());
}

#[test]
fn test_concurrent_callers_only_one_dispatched() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = coordinator.clone();
            let callback = recorder.callback();
            thread::spawn(move || coordinator.sign_in(callback))
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // Seven rejections delivered synchronously, one request outstanding
    assert_eq!(provider.request_count(), 1);
    let rejected = recorder.take();
    assert_eq!(rejected.len(), 7);
    rejected.iter().for_each(assert_rejected_in_progress);

    provider.complete_next(TestFixtures::authorization());
    assert_login_success(recorder.take_single(), TEST_USER_ID);
}

#[test]
fn test_abandoned_handle_keeps_coordinator_busy() {
    let (coordinator, provider) = setup();
    let recorder = ResultRecorder::new();

    coordinator.sign_in(|_| {});
    drop(provider.take_handle());

    // No timeout exists, so the next caller is still rejected
    coordinator.sign_in(recorder.callback());
    assert_rejected_in_progress(&recorder.take_single());
}
