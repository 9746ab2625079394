//! Operator onboarding, promotion, and listing

use cinema_core::entities::{Role, RoleExtension};
use cinema_core::UserId;
use cinema_service::dto::{CreateUserRequest, EmailSignInRequest, PromoteToAdminRequest};
use cinema_service::Principal;
use integration_tests::{unique_email, unique_phone, TestApp};

fn create_request(role: &str) -> CreateUserRequest {
    CreateUserRequest {
        name: "Operator".to_string(),
        email: unique_email(),
        phone: unique_phone(),
        password: "ticket-booth".to_string(),
        role: role.to_string(),
        level: None,
        dept: None,
    }
}

#[tokio::test]
async fn test_admin_creates_verified_staff() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;

    let mut request = create_request("staff");
    request.dept = Some("concessions".to_string());
    let email = request.email.clone();
    let created = app.admin().create_user(&admin, request).await.unwrap();

    assert_eq!(created.role, Role::Staff);
    assert!(created.is_verified);
    assert_eq!(
        created.extension,
        RoleExtension::Staff {
            dept: "concessions".to_string()
        }
    );

    // the new account can sign in with its password
    let session = app
        .auth()
        .email_sign_in(EmailSignInRequest {
            name: None,
            email,
            password: "ticket-booth".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.role, Role::Staff);
    assert!(!session.needs_phone_verification);
}

#[tokio::test]
async fn test_admin_creates_admin_with_default_level() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;

    let created = app.admin().create_user(&admin, create_request("ADMIN")).await.unwrap();
    assert_eq!(
        created.extension,
        RoleExtension::Admin {
            level: "admin".to_string()
        }
    );
}

#[tokio::test]
async fn test_create_user_rejects_customer_and_unknown_roles() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;

    let err = app.admin().create_user(&admin, create_request("customer")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = app.admin().create_user(&admin, create_request("janitor")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.error_code(), "INVALID_ROLE");
}

#[tokio::test]
async fn test_create_user_short_password() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;
    let mut request = create_request("staff");
    request.password = "12345".to_string();

    let err = app.admin().create_user(&admin, request).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_create_user_hashes_password_that_looks_hashed() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;
    let mut request = create_request("staff");
    request.password = "$argon2id$operator".to_string();
    let email = request.email.clone();

    let created = app.admin().create_user(&admin, request).await.unwrap();

    let stored = app.users.snapshot(created.id.parse().unwrap()).unwrap();
    assert_ne!(stored.password_hash.as_deref(), Some("$argon2id$operator"));

    let session = app
        .auth()
        .email_sign_in(EmailSignInRequest {
            name: None,
            email,
            password: "$argon2id$operator".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.role, Role::Staff);
}

#[tokio::test]
async fn test_create_user_existing_identity_conflicts() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;
    let existing = app.seed_customer().await;
    let before = app.users.count();

    let mut request = create_request("staff");
    request.email = existing.email.clone().unwrap();
    let err = app.admin().create_user(&admin, request).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(app.users.count(), before);
    assert_eq!(app.users.snapshot(existing.id).unwrap().role, Role::Customer);
}

#[tokio::test]
async fn test_non_admin_callers_are_forbidden() {
    let app = TestApp::new();
    let staff = Principal::from(&app.seed_user(Role::Staff).await);
    let customer = Principal::from(&app.seed_customer().await);

    for caller in [staff, customer] {
        let err = app.admin().create_user(&caller, create_request("staff")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(app.admin().list_users(&caller).await.unwrap_err().status_code(), 403);
    }
}

#[tokio::test]
async fn test_promote_staff_to_admin() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;
    let staff = app.seed_user(Role::Staff).await;

    let promoted = app
        .admin()
        .promote_to_admin(
            &admin,
            staff.id,
            PromoteToAdminRequest {
                level: Some("manager".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(promoted.role, Role::Admin);
    assert_eq!(
        promoted.extension,
        RoleExtension::Admin {
            level: "manager".to_string()
        }
    );
    assert_eq!(app.roles.rows_for(staff.id), (1, 1, 0));
}

#[tokio::test]
async fn test_promote_rejects_non_staff_targets() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;
    let customer = app.seed_customer().await;

    let err = app
        .admin()
        .promote_to_admin(&admin, customer.id, PromoteToAdminRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = app
        .admin()
        .promote_to_admin(&admin, admin.user_id, PromoteToAdminRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = app
        .admin()
        .promote_to_admin(&admin, UserId::new(9999), PromoteToAdminRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_users_newest_first_with_summaries() {
    let app = TestApp::new();
    let admin = app.seed_admin().await;
    let staff = app.seed_user(Role::Staff).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let customer = app.seed_customer().await;

    let users = app.admin().list_users(&admin).await.unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(users[0].id, customer.id.to_string());
    assert_eq!(users[0].extension, RoleExtension::Customer { loyalty_points: 0 });
    let staff_row = users.iter().find(|u| u.id == staff.id.to_string()).unwrap();
    assert_eq!(
        staff_row.extension,
        RoleExtension::Staff {
            dept: "general".to_string()
        }
    );
}
