//! Phone OTP request and verification

use cinema_cache::OtpKeys;
use cinema_core::entities::{IdentityCandidate, OtpStatus, Role, RoleDetails};
use cinema_core::UserId;
use cinema_service::dto::{OtpRequestOutcome, OtpVerification};
use cinema_service::ServiceError;
use integration_tests::{otp_check, otp_request, unique_phone, TestApp, TEST_OTP_CODE};

// ============================================================================
// Requesting a code
// ============================================================================

#[tokio::test]
async fn test_request_caches_code_and_records_history() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();

    let outcome = app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();

    assert_eq!(outcome, OtpRequestOutcome::Sent { expires_in: 300 });
    assert_eq!(app.sender.sent_to(), vec![phone.clone()]);
    assert_eq!(app.cache.peek(&OtpKeys::code(user.id, &phone)).as_deref(), Some(TEST_OTP_CODE));
    assert!(app.cache.peek(&OtpKeys::cooldown(&phone)).is_some());

    let history = app.ctx.otp_repo().list_for(user.id, &phone).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OtpStatus::Sent);
}

#[tokio::test]
async fn test_second_request_within_cooldown_is_rate_limited() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();

    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    let err = app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap_err();

    assert!(matches!(err, ServiceError::RateLimited { retry_after_secs } if retry_after_secs >= 1));
    assert_eq!(err.status_code(), 429);
    // cooldown precedes code generation
    assert_eq!(app.sender.sent_to().len(), 1);
}

#[tokio::test]
async fn test_request_allowed_after_cooldown_lapses() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();

    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    app.cache.expire(&OtpKeys::cooldown(&phone));

    assert!(app.verification().request_otp(user.id, otp_request(&phone)).await.is_ok());
    assert_eq!(app.sender.sent_to().len(), 2);
}

#[tokio::test]
async fn test_cooldown_fails_open_but_code_storage_fails_loud() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    app.cache.set_down(true);

    let err = app
        .verification()
        .request_otp(user.id, otp_request(&unique_phone()))
        .await
        .unwrap_err();

    // the cooldown check let it through; caching the code is what failed
    assert_eq!(app.sender.sent_to().len(), 1);
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.to_response().message, "Internal server error");
}

#[tokio::test]
async fn test_history_failure_does_not_block_request() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    app.otps.set_fail(true);

    let outcome = app
        .verification()
        .request_otp(user.id, otp_request(&unique_phone()))
        .await
        .unwrap();
    assert!(matches!(outcome, OtpRequestOutcome::Sent { .. }));
}

#[tokio::test]
async fn test_request_for_verified_phone_short_circuits() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    app.verification()
        .verify_otp(user.id, otp_check(&phone, TEST_OTP_CODE))
        .await
        .unwrap();
    app.cache.expire(&OtpKeys::cooldown(&phone));

    let outcome = app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();

    assert_eq!(outcome, OtpRequestOutcome::AlreadyVerified);
    assert_eq!(app.sender.sent_to().len(), 1);
}

#[tokio::test]
async fn test_request_with_malformed_phone_sends_nothing() {
    let app = TestApp::new();
    let user = app.seed_customer().await;

    let err = app
        .verification()
        .request_otp(user.id, otp_request("+1"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(app.sender.sent_to().is_empty());
    assert_eq!(app.cache.reads(), 0);
}

#[tokio::test]
async fn test_request_for_unknown_user() {
    let app = TestApp::new();
    let err = app
        .verification()
        .request_otp(UserId::new(404), otp_request(&unique_phone()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Verifying a code
// ============================================================================

#[tokio::test]
async fn test_correct_code_verifies_and_binds_phone() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();

    let result = app
        .verification()
        .verify_otp(user.id, otp_check(&phone, TEST_OTP_CODE))
        .await
        .unwrap();

    let OtpVerification::Verified(session) = result else {
        panic!("expected a verified session");
    };
    assert!(session.is_verified);
    assert!(!session.needs_phone_verification);
    assert_eq!(session.role, Role::Customer);
    let claims = app.jwt.validate_access_token(&session.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);

    let stored = app.users.snapshot(user.id).unwrap();
    assert!(stored.is_verified);
    assert_eq!(stored.phone_number.as_deref(), Some(phone.as_str()));
    assert!(app.cache.peek(&OtpKeys::code(user.id, &phone)).is_none());

    let history = app.ctx.otp_repo().list_for(user.id, &phone).await.unwrap();
    assert_eq!(history[0].status, OtpStatus::Verified);
    assert!(history[0].verified_at.is_some());
}

#[tokio::test]
async fn test_wrong_code_counts_failure_and_changes_nothing() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();

    for attempt in 1..=2 {
        let err = app
            .verification()
            .verify_otp(user.id, otp_check(&phone, "000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOtp));
        assert!(!err.to_string().contains(TEST_OTP_CODE));
        assert_eq!(app.verification().failed_attempts(user.id, &phone).await, attempt);
    }

    let stored = app.users.snapshot(user.id).unwrap();
    assert!(!stored.is_verified);
    assert!(stored.phone_number.is_none());
    // the issued code is still usable
    assert!(app.cache.peek(&OtpKeys::code(user.id, &phone)).is_some());

    let history = app.ctx.otp_repo().list_for(user.id, &phone).await.unwrap();
    assert_eq!(history[0].status, OtpStatus::Failed);
    assert_eq!(history[0].failed_attempts, 2);
}

#[tokio::test]
async fn test_short_code_rejected_before_cache_lookup() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    let reads = app.cache.reads();

    let err = app
        .verification()
        .verify_otp(user.id, otp_check(&phone, "12345"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(!matches!(err, ServiceError::InvalidOtp));
    assert_eq!(app.cache.reads(), reads);
    assert_eq!(app.verification().failed_attempts(user.id, &phone).await, 0);
    let history = app.ctx.otp_repo().list_for(user.id, &phone).await.unwrap();
    assert_eq!(history[0].status, OtpStatus::Sent);
}

#[tokio::test]
async fn test_expired_code_is_a_mismatch() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    app.cache.expire(&OtpKeys::code(user.id, &phone));

    let err = app
        .verification()
        .verify_otp(user.id, otp_check(&phone, TEST_OTP_CODE))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOtp));
}

#[tokio::test]
async fn test_cache_outage_fails_closed() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    app.cache.set_down(true);

    let err = app
        .verification()
        .verify_otp(user.id, otp_check(&phone, TEST_OTP_CODE))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidOtp));
    assert!(!app.users.snapshot(user.id).unwrap().is_verified);
}

#[tokio::test]
async fn test_phone_held_by_another_user_is_conflict() {
    let app = TestApp::new();
    let holder = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_phone("+1555").verified(),
            RoleDetails::unspecified(Role::Customer),
        )
        .await
        .unwrap()
        .user;
    let other = app.seed_customer().await;

    app.verification().request_otp(other.id, otp_request("+1555")).await.unwrap();
    let err = app
        .verification()
        .verify_otp(other.id, otp_check("+1555", TEST_OTP_CODE))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.status_code(), 409);
    let unchanged = app.users.snapshot(other.id).unwrap();
    assert!(!unchanged.is_verified);
    assert!(unchanged.phone_number.is_none());
    assert_eq!(
        app.users.snapshot(holder.id).unwrap().phone_number.as_deref(),
        Some("+1555")
    );
}

#[tokio::test]
async fn test_wrong_code_never_reveals_phone_conflict() {
    let app = TestApp::new();
    app.identity()
        .resolve_or_create(
            IdentityCandidate::new().with_phone("+1666"),
            RoleDetails::unspecified(Role::Customer),
        )
        .await
        .unwrap();
    let other = app.seed_customer().await;
    app.verification().request_otp(other.id, otp_request("+1666")).await.unwrap();

    let err = app
        .verification()
        .verify_otp(other.id, otp_check("+1666", "999999"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOtp));
}

#[tokio::test]
async fn test_verify_for_already_verified_phone() {
    let app = TestApp::new();
    let user = app.seed_customer().await;
    let phone = unique_phone();
    app.verification().request_otp(user.id, otp_request(&phone)).await.unwrap();
    app.verification()
        .verify_otp(user.id, otp_check(&phone, TEST_OTP_CODE))
        .await
        .unwrap();

    let again = app
        .verification()
        .verify_otp(user.id, otp_check(&phone, "123123"))
        .await
        .unwrap();
    assert!(matches!(again, OtpVerification::AlreadyVerified { role: Role::Customer }));
}
