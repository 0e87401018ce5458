//! Auth Flow Integration Tests
//!
//! Exercises register, login, refresh rotation, and logout end to end
//! against the in-memory stores.

use ag_identity::{
    Argon2Config, AuthError, AuthService, AuthServiceConfig, AuthStores, PasswordPolicy,
    TokenConfig, User, UserStore,
};

fn test_config() -> AuthServiceConfig {
    AuthServiceConfig {
        token: TokenConfig {
            secret: "integration-test-secret".to_string(),
            ..TokenConfig::default()
        },
        argon2: Argon2Config::testing(),
        policy: PasswordPolicy::lenient(),
        ..AuthServiceConfig::default()
    }
}

fn test_service() -> AuthService {
    AuthService::new(test_config(), AuthStores::in_memory(), Vec::new())
}

#[tokio::test]
async fn test_register_then_login() {
    let service = test_service();

    let registered = service
        .register("alice@example.com", "correct-horse-battery", "Alice")
        .await
        .unwrap();

    let logged_in = service
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();

    assert_eq!(registered.user.id, logged_in.user.id);

    let claims = service
        .validate_access_token(&logged_in.access_token)
        .unwrap();
    assert_eq!(claims.sub, registered.user.id.to_string());
    assert_eq!(claims.email, "alice@example.com");
    assert!(claims.roles.contains(&"user".to_string()));
}

#[tokio::test]
async fn test_duplicate_email_rejected_despite_case_and_whitespace() {
    let service = test_service();

    service
        .register("bob@example.com", "correct-horse-battery", "Bob")
        .await
        .unwrap();

    let err = service
        .register("  BOB@Example.com ", "another-password", "Bob Again")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailAlreadyExists));
}

#[tokio::test]
async fn test_password_policy_enforced() {
    let config = AuthServiceConfig {
        policy: PasswordPolicy::default(),
        ..test_config()
    };
    let service = AuthService::new(config, AuthStores::in_memory(), Vec::new());

    let err = service
        .register("carol@example.com", "weak", "Carol")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::PasswordPolicyViolation { .. }));
}

#[tokio::test]
async fn test_password_containing_local_part_rejected() {
    let service = test_service();

    let err = service
        .register("daniel@example.com", "xxdanielxx99", "Daniel")
        .await
        .unwrap_err();

    match err {
        AuthError::PasswordPolicyViolation { reason } => {
            assert!(reason.contains("email address"));
        }
        other => panic!("Expected policy violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_password_indistinguishable_from_unknown_email() {
    let service = test_service();

    service
        .register("erin@example.com", "correct-horse-battery", "Erin")
        .await
        .unwrap();

    let wrong_password = service
        .login("erin@example.com", "incorrect-horse")
        .await
        .unwrap_err();
    let unknown_email = service
        .login("nobody@example.com", "incorrect-horse")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_password_login_disabled_for_oauth_only_account() {
    let stores = AuthStores::in_memory();
    let users = stores.users.clone();
    let service = AuthService::new(test_config(), stores, Vec::new());

    // Provider-created accounts carry no password hash
    users
        .create(&User::new("sso@example.com", "SSO Only"))
        .await
        .unwrap();

    let err = service
        .login("sso@example.com", "any-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::PasswordLoginDisabled));
}

#[tokio::test]
async fn test_refresh_rotation_is_single_use() {
    let service = test_service();

    let first = service
        .register("frank@example.com", "correct-horse-battery", "Frank")
        .await
        .unwrap();

    let second = service.refresh(&first.refresh_token).await.unwrap();
    assert_eq!(second.user.id, first.user.id);
    assert_ne!(second.refresh_token, first.refresh_token);

    // Replaying the consumed token fails
    let err = service.refresh(&first.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenRevoked));

    // The replacement still works
    service.refresh(&second.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_refresh_admits_one_winner() {
    let service = test_service();

    let result = service
        .register("grace@example.com", "correct-horse-battery", "Grace")
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        service.refresh(&result.refresh_token),
        service.refresh(&result.refresh_token),
    );

    assert!(
        a.is_ok() != b.is_ok(),
        "exactly one concurrent refresh must win"
    );
}

#[tokio::test]
async fn test_expired_refresh_token_rejected() {
    let config = AuthServiceConfig {
        token: TokenConfig {
            secret: "integration-test-secret".to_string(),
            refresh_token_ttl_secs: -60,
            ..TokenConfig::default()
        },
        ..test_config()
    };
    let service = AuthService::new(config, AuthStores::in_memory(), Vec::new());

    let result = service
        .register("heidi@example.com", "correct-horse-battery", "Heidi")
        .await
        .unwrap();

    let err = service.refresh(&result.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenExpired));
}

#[tokio::test]
async fn test_garbage_refresh_token_rejected() {
    let service = test_service();

    assert!(matches!(
        service.refresh("").await.unwrap_err(),
        AuthError::RefreshTokenInvalid
    ));
    assert!(matches!(
        service.refresh("no-such-token").await.unwrap_err(),
        AuthError::RefreshTokenInvalid
    ));
}

#[tokio::test]
async fn test_logout_revokes_presented_token_only() {
    let service = test_service();

    let first = service
        .register("ivan@example.com", "correct-horse-battery", "Ivan")
        .await
        .unwrap();
    let second = service
        .login("ivan@example.com", "correct-horse-battery")
        .await
        .unwrap();

    service.logout(&first.refresh_token, false).await.unwrap();

    assert!(matches!(
        service.refresh(&first.refresh_token).await.unwrap_err(),
        AuthError::RefreshTokenRevoked
    ));
    service.refresh(&second.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let service = test_service();

    let first = service
        .register("judy@example.com", "correct-horse-battery", "Judy")
        .await
        .unwrap();
    let second = service
        .login("judy@example.com", "correct-horse-battery")
        .await
        .unwrap();

    service.logout(&first.refresh_token, true).await.unwrap();

    assert!(matches!(
        service.refresh(&first.refresh_token).await.unwrap_err(),
        AuthError::RefreshTokenRevoked
    ));
    assert!(matches!(
        service.refresh(&second.refresh_token).await.unwrap_err(),
        AuthError::RefreshTokenRevoked
    ));
}

#[tokio::test]
async fn test_first_admin_promotion() {
    let service = test_service();

    let first = service
        .register("root@example.com", "correct-horse-battery", "Root")
        .await
        .unwrap();
    assert!(first.user.has_role("admin"));
    assert!(first.user.has_role("user"));

    let second = service
        .register("member@example.com", "correct-horse-battery", "Member")
        .await
        .unwrap();
    assert!(!second.user.has_role("admin"));
}

#[tokio::test]
async fn test_first_admin_disabled() {
    let config = AuthServiceConfig {
        allow_first_admin: false,
        ..test_config()
    };
    let service = AuthService::new(config, AuthStores::in_memory(), Vec::new());

    let result = service
        .register("root@example.com", "correct-horse-battery", "Root")
        .await
        .unwrap();
    assert!(!result.user.has_role("admin"));
    assert_eq!(result.user.roles, vec!["user".to_string()]);
}

#[tokio::test]
async fn test_concurrent_registration_same_email_one_winner() {
    let service = test_service();

    let (a, b) = tokio::join!(
        service.register("race@example.com", "password-one-1", "A"),
        service.register("race@example.com", "password-two-2", "B"),
    );

    assert!(
        a.is_ok() != b.is_ok(),
        "exactly one concurrent registration must win"
    );

    let loser = if a.is_err() { a } else { b };
    assert!(matches!(
        loser.unwrap_err(),
        AuthError::EmailAlreadyExists
    ));
}
