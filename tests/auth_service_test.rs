//! Authentication service unit tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use mockall::predicate::eq;
use uuid::Uuid;

use bugtrail::config::Config;
use bugtrail::domain::{Password, User, UserRole};
use bugtrail::errors::AppError;
use bugtrail::infra::{
    BugRepository, MockBugRepository, MockUserRepository, UnitOfWork, UserRepository,
};
use bugtrail::services::{AuthService, Authenticator, Claims};

fn test_user(id: Uuid, email: &str, password_hash: &str, role: UserRole) -> User {
    User {
        id,
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Test UnitOfWork wrapping mock repositories
struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    bugs: Arc<MockBugRepository>,
}

impl TestUnitOfWork {
    fn new(users: MockUserRepository) -> Self {
        Self {
            users: Arc::new(users),
            bugs: Arc::new(MockBugRepository::new()),
        }
    }
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn bugs(&self) -> Arc<dyn BugRepository> {
        self.bugs.clone()
    }
}

fn service(users: MockUserRepository) -> Authenticator<TestUnitOfWork> {
    Authenticator::new(Arc::new(TestUnitOfWork::new(users)), Config::for_tests())
}

#[tokio::test]
async fn register_hashes_password_and_lowercases_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq("alice@x.com"))
        .returning(|_| Ok(None));
    users
        .expect_create()
        .withf(|name, email, hash| {
            name.as_str() == "Alice"
                && email.as_str() == "alice@x.com"
                && hash.starts_with("$argon2")
                && hash.as_str() != "password123"
        })
        .returning(|name, email, hash| {
            let mut user = test_user(Uuid::new_v4(), &email, &hash, UserRole::User);
            user.name = name;
            Ok(user)
        });

    let result = service(users)
        .register(
            "Alice".to_string(),
            "Alice@X.com".to_string(),
            "password123".to_string(),
        )
        .await;

    let user = result.unwrap();
    assert_eq!(user.email, "alice@x.com");
    assert_eq!(user.name, "Alice");
}

#[tokio::test]
async fn register_rejects_duplicate_email_case_insensitively() {
    let mut users = MockUserRepository::new();
    // "Bob@X.com" is normalized before lookup, so the existing lowercase
    // record is found and registration is refused
    users
        .expect_find_by_email()
        .with(eq("bob@x.com"))
        .returning(|_| {
            Ok(Some(test_user(
                Uuid::new_v4(),
                "bob@x.com",
                "hash",
                UserRole::User,
            )))
        });

    let result = service(users)
        .register(
            "Bob".to_string(),
            "Bob@X.com".to_string(),
            "password123".to_string(),
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::DuplicateEmail));
}

#[tokio::test]
async fn register_rejects_short_password_before_touching_the_store() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let result = service(users)
        .register(
            "Carol".to_string(),
            "carol@x.com".to_string(),
            "short".to_string(),
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn login_with_unknown_email_fails_uniformly() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let result = service(users)
        .login("nobody@x.com".to_string(), "password123".to_string())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn login_with_wrong_password_fails_uniformly() {
    let stored_hash = Password::new("correct-password").unwrap().into_string();
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(move |_| {
        Ok(Some(test_user(
            Uuid::new_v4(),
            "alice@x.com",
            &stored_hash,
            UserRole::User,
        )))
    });

    let result = service(users)
        .login("alice@x.com".to_string(), "wrong-password".to_string())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn login_returns_user_and_verifiable_token() {
    let user_id = Uuid::new_v4();
    let stored_hash = Password::new("correct-password").unwrap().into_string();
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(move |_| {
        Ok(Some(test_user(
            user_id,
            "alice@x.com",
            &stored_hash,
            UserRole::User,
        )))
    });

    let svc = service(users);
    let (user, token) = svc
        .login("alice@x.com".to_string(), "correct-password".to_string())
        .await
        .unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(token.token_type, "Bearer");

    let claims = svc.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn expired_token_is_rejected_as_expired() {
    let config = Config::for_tests();
    let claims = Claims {
        sub: Uuid::new_v4(),
        exp: (Utc::now() - Duration::days(2)).timestamp(),
        iat: (Utc::now() - Duration::days(32)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )
    .unwrap();

    let svc = service(MockUserRepository::new());
    let result = svc.verify_token(&token);

    assert!(matches!(result.unwrap_err(), AppError::ExpiredToken));
}

#[tokio::test]
async fn tampered_token_is_rejected_as_invalid() {
    let svc = service(MockUserRepository::new());
    let token = svc.issue_token(Uuid::new_v4()).unwrap();

    // Flip the last character of the signature
    let mut tampered = token.access_token;
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let result = svc.verify_token(&tampered);
    assert!(matches!(result.unwrap_err(), AppError::InvalidToken));
}

#[tokio::test]
async fn resolve_principal_rereads_role_from_the_store() {
    let user_id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    // The stored role is admin even though nothing in the token says so
    users
        .expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(test_user(id, "root@x.com", "hash", UserRole::Admin))));

    let svc = service(users);
    let token = svc.issue_token(user_id).unwrap();
    let principal = svc.resolve_principal(&token.access_token).await.unwrap();

    assert_eq!(principal.id, user_id);
    assert!(principal.is_admin());
}

#[tokio::test]
async fn token_for_vanished_user_does_not_resolve() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let svc = service(users);
    let token = svc.issue_token(Uuid::new_v4()).unwrap();
    let result = svc.resolve_principal(&token.access_token).await;

    assert!(matches!(result.unwrap_err(), AppError::InvalidToken));
}
