//! Identity resolution, merge, and role extension sync

use cinema_core::entities::{IdentityCandidate, Role, RoleDetails, RoleExtension};
use cinema_core::UserId;
use integration_tests::{unique_email, unique_phone, TestApp};

fn customer() -> RoleDetails {
    RoleDetails::unspecified(Role::Customer)
}

// ============================================================================
// Resolution precedence
// ============================================================================

#[tokio::test]
async fn test_new_phone_creates_unverified_customer_with_zero_points() {
    let app = TestApp::new();

    let resolved = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone("+1555"), customer())
        .await
        .unwrap();

    assert!(resolved.created);
    assert!(!resolved.user.is_verified);
    assert_eq!(resolved.user.role, Role::Customer);
    assert_eq!(resolved.extension, Some(RoleExtension::Customer { loyalty_points: 0 }));
    assert_eq!(app.roles.rows_for(resolved.user.id), (0, 0, 1));
}

#[tokio::test]
async fn test_matching_phone_returns_existing_user() {
    let app = TestApp::new();
    let phone = unique_phone();
    let first = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone), customer())
        .await
        .unwrap();

    let second = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_phone(&phone).with_email(&unique_email()),
            customer(),
        )
        .await
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(app.users.count(), 1);
}

#[tokio::test]
async fn test_distinct_candidates_get_distinct_ids() {
    let app = TestApp::new();
    let mut ids = Vec::new();
    for _ in 0..5 {
        let resolved = app
            .identity()
            .resolve_or_create(IdentityCandidate::new().with_email(&unique_email()), customer())
            .await
            .unwrap();
        assert!(resolved.created);
        ids.push(resolved.user.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn test_email_match_is_case_insensitive_and_updates_name() {
    let app = TestApp::new();
    let first = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_email("A@B.com"), customer())
        .await
        .unwrap();
    assert_eq!(first.user.email.as_deref(), Some("a@b.com"));

    let second = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email("a@b.com").with_name("X"),
            customer(),
        )
        .await
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(second.user.name, "X");
    assert_eq!(app.users.snapshot(first.user.id).unwrap().name, "X");
}

#[tokio::test]
async fn test_phone_takes_precedence_over_email() {
    let app = TestApp::new();
    let by_phone = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone("+1777"), customer())
        .await
        .unwrap();
    let by_email = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_email("other@example.com"), customer())
        .await
        .unwrap();

    // the phone match wins; filling its empty email slot then collides
    let err = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new()
                .with_phone("+1777")
                .with_email("other@example.com"),
            customer(),
        )
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(app.users.snapshot(by_phone.user.id).unwrap().email.is_none());
    assert!(app.users.snapshot(by_email.user.id).unwrap().phone_number.is_none());
}

#[tokio::test]
async fn test_phone_match_fills_free_email() {
    let app = TestApp::new();
    let phone = unique_phone();
    let by_phone = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone), customer())
        .await
        .unwrap();

    let email = unique_email();
    let resolved = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_phone(&phone).with_email(&email),
            customer(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.user.id, by_phone.user.id);
    assert_eq!(resolved.user.email.as_deref(), Some(email.as_str()));
}

#[tokio::test]
async fn test_external_id_matches_last() {
    let app = TestApp::new();
    let google = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_external_id("google-sub-1"),
            customer(),
        )
        .await
        .unwrap();

    let resolved = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new()
                .with_external_id("google-sub-1")
                .with_email(&unique_email()),
            customer(),
        )
        .await
        .unwrap();

    assert!(!resolved.created);
    assert_eq!(resolved.user.id, google.user.id);
    assert!(resolved.user.email.is_some());
}

#[tokio::test]
async fn test_candidate_without_channel_is_rejected_before_store() {
    let app = TestApp::new();
    let err = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_name("Nobody"), customer())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.error_code(), "MISSING_IDENTITY");
    assert_eq!(app.users.insert_count(), 0);
}

// ============================================================================
// Merge rules
// ============================================================================

#[tokio::test]
async fn test_merge_never_overwrites_identity_channels() {
    let app = TestApp::new();
    let phone = unique_phone();
    let original = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new()
                .with_phone(&phone)
                .with_email("keep@example.com")
                .with_external_id("sub-keep"),
            customer(),
        )
        .await
        .unwrap();

    let merged = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new()
                .with_phone(&phone)
                .with_email("new@example.com")
                .with_external_id("sub-new"),
            customer(),
        )
        .await
        .unwrap();

    assert_eq!(merged.user.id, original.user.id);
    assert_eq!(merged.user.email.as_deref(), Some("keep@example.com"));
    assert_eq!(merged.user.external_id.as_deref(), Some("sub-keep"));
}

#[tokio::test]
async fn test_merge_never_clears_verification() {
    let app = TestApp::new();
    let phone = unique_phone();
    let verified = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone).verified(), customer())
        .await
        .unwrap();
    assert!(verified.user.is_verified);

    let merged = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone).with_name("Later"), customer())
        .await
        .unwrap();

    assert!(merged.user.is_verified);
    assert!(app.users.snapshot(merged.user.id).unwrap().is_verified);
}

#[tokio::test]
async fn test_plaintext_password_is_hashed_once_and_never_replaced() {
    let app = TestApp::new();
    let email = unique_email();

    let created = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&email).with_password("first-pass"),
            customer(),
        )
        .await
        .unwrap();
    let stored = created.user.password_hash.clone().unwrap();
    assert!(stored.starts_with("$argon2"));
    assert!(app.ctx.password_service().verify("first-pass", &stored).unwrap());

    let merged = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&email).with_password("second-pass"),
            customer(),
        )
        .await
        .unwrap();
    assert_eq!(merged.user.password_hash.as_deref(), Some(stored.as_str()));
}

#[tokio::test]
async fn test_prehashed_password_replaces_and_is_not_rehashed() {
    let app = TestApp::new();
    let email = unique_email();
    app.identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&email).with_password("first-pass"),
            customer(),
        )
        .await
        .unwrap();

    let new_hash = app.ctx.password_service().hash("rotated-pass").unwrap();
    let merged = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&email).with_password(&new_hash),
            customer(),
        )
        .await
        .unwrap();

    assert_eq!(merged.user.password_hash.as_deref(), Some(new_hash.as_str()));
}

#[tokio::test]
async fn test_password_fills_account_without_one() {
    let app = TestApp::new();
    let email = unique_email();
    let google = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&email).with_external_id("sub-9"),
            customer(),
        )
        .await
        .unwrap();
    assert!(google.user.password_hash.is_none());

    let merged = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&email).with_password("now-i-have-one"),
            customer(),
        )
        .await
        .unwrap();
    let hash = merged.user.password_hash.unwrap();
    assert!(app.ctx.password_service().verify("now-i-have-one", &hash).unwrap());
}

// ============================================================================
// Role extensions
// ============================================================================

#[tokio::test]
async fn test_resolve_twice_is_idempotent() {
    let app = TestApp::new();
    let phone = unique_phone();
    let details = RoleDetails::staff(Some("projection"));

    let first = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone), details.clone())
        .await
        .unwrap();
    let second = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone), details)
        .await
        .unwrap();

    assert_eq!(first.user.id, second.user.id);
    assert_eq!(app.users.count(), 1);
    assert_eq!(app.roles.rows_for(first.user.id), (0, 1, 0));
    assert_eq!(
        second.extension,
        Some(RoleExtension::Staff {
            dept: "projection".to_string()
        })
    );
}

#[tokio::test]
async fn test_trusted_roles_start_verified_with_defaults() {
    let app = TestApp::new();

    let admin = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&unique_email()),
            RoleDetails::admin(None),
        )
        .await
        .unwrap();
    assert!(admin.user.is_verified);
    assert_eq!(
        admin.extension,
        Some(RoleExtension::Admin {
            level: "admin".to_string()
        })
    );

    let staff = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(&unique_email()),
            RoleDetails::staff(Some("   ")),
        )
        .await
        .unwrap();
    assert!(staff.user.is_verified);
    assert_eq!(
        staff.extension,
        Some(RoleExtension::Staff {
            dept: "general".to_string()
        })
    );
}

#[tokio::test]
async fn test_existing_role_wins_over_candidate_role() {
    let app = TestApp::new();
    let staff = app.seed_user(Role::Staff).await;

    let resolved = app
        .identity()
        .resolve_or_create(
            IdentityCandidate::new().with_email(staff.email.as_deref().unwrap()),
            RoleDetails::customer(Some(50)),
        )
        .await
        .unwrap();

    assert_eq!(resolved.user.role, Role::Staff);
    assert_eq!(resolved.extension.unwrap().role(), Role::Staff);
    assert_eq!(app.roles.rows_for(staff.id), (0, 1, 0));
}

#[tokio::test]
async fn test_upsert_keeps_stored_value_when_attribute_missing() {
    let app = TestApp::new();
    let phone = unique_phone();
    app.identity()
        .resolve_or_create(
            IdentityCandidate::new().with_phone(&phone),
            RoleDetails::customer(Some(120)),
        )
        .await
        .unwrap();

    let again = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&phone), customer())
        .await
        .unwrap();

    assert_eq!(again.extension, Some(RoleExtension::Customer { loyalty_points: 120 }));
}

#[tokio::test]
async fn test_staff_upgraded_to_admin_without_level_gets_default() {
    let app = TestApp::new();
    let staff = app.seed_user(Role::Staff).await;

    for _ in 0..2 {
        let changed = app
            .identity()
            .change_role(staff.id, RoleDetails::admin(None))
            .await
            .unwrap();
        assert_eq!(changed.user.role, Role::Admin);
        assert_eq!(
            changed.extension,
            Some(RoleExtension::Admin {
                level: "admin".to_string()
            })
        );
    }

    // the staff row stays behind after the role change
    assert_eq!(app.roles.rows_for(staff.id), (1, 1, 0));
    assert_eq!(app.users.snapshot(staff.id).unwrap().role, Role::Admin);
}

#[tokio::test]
async fn test_extension_failure_keeps_user() {
    let app = TestApp::new();
    app.roles.set_fail_writes(true);

    let resolved = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_phone(&unique_phone()), customer())
        .await
        .unwrap();

    assert!(resolved.created);
    assert!(resolved.extension.is_none());
    assert!(app.users.snapshot(resolved.user.id).is_some());
    assert_eq!(app.roles.rows_for(resolved.user.id), (0, 0, 0));

    // reads fall back to neutral values
    assert_eq!(
        app.identity().role_summary(&resolved.user).await,
        RoleExtension::Customer { loyalty_points: 0 }
    );
}

#[tokio::test]
async fn test_role_summary_neutral_for_missing_rows() {
    let app = TestApp::new();
    app.roles.set_fail_writes(true);
    let admin = app.seed_user(Role::Admin).await;

    assert_eq!(
        app.identity().role_summary(&admin).await,
        RoleExtension::Admin {
            level: "unknown".to_string()
        }
    );
}

// ============================================================================
// Concurrency backstop
// ============================================================================

#[tokio::test]
async fn test_insert_race_surfaces_as_conflict() {
    let app = TestApp::new();
    let email = unique_email();
    app.identity()
        .resolve_or_create(IdentityCandidate::new().with_email(&email), customer())
        .await
        .unwrap();

    // the losing request read before the winner committed
    app.users.set_blind_lookups(true);
    let err = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_email(&email), customer())
        .await
        .unwrap_err();
    app.users.set_blind_lookups(false);

    assert!(err.is_conflict());
    assert_eq!(err.status_code(), 409);
    assert_eq!(app.users.count(), 1);

    // a retry resolves to the winner
    let retry = app
        .identity()
        .resolve_or_create(IdentityCandidate::new().with_email(&email), customer())
        .await
        .unwrap();
    assert!(!retry.created);
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let app = TestApp::new();
    let err = app.identity().get(UserId::new(999)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}
