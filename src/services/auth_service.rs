//! Authentication service - registration, login, and bearer tokens.
//!
//! Tokens carry only the user id and expiry. Role is deliberately not a
//! claim: it is re-read from the credential store on every request, so a
//! promotion or demotion takes effect immediately instead of living on
//! in already-issued tokens.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_DAY, TOKEN_TYPE_BEARER};
use crate::domain::{Password, Principal, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload: subject, expiry, and issue time only.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 2592000)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, name: String, email: String, password: String) -> AppResult<User>;

    /// Authenticate by email and password, returning the user and a token
    async fn login(&self, email: String, password: String) -> AppResult<(User, TokenResponse)>;

    /// Issue a signed bearer token for a user id
    fn issue_token(&self, user_id: Uuid) -> AppResult<TokenResponse>;

    /// Verify signature and expiry, returning the decoded claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Verify a token and resolve it to a principal with the role as
    /// currently stored
    async fn resolve_principal(&self, token: &str) -> AppResult<Principal>;
}

/// A well-formed Argon2 hash that no password verifies against. Login
/// runs verification against this when the email is unknown, so unknown
/// email and wrong password are indistinguishable by timing.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$4qzXIsYBEZPjTvW2X8BNRnXvcLMo21qcLUZnEZ+GCsM";

/// Emails are matched and stored lowercased so uniqueness and lookup are
/// case-insensitive.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, name: String, email: String, password: String) -> AppResult<User> {
        let email = normalize_email(&email);

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        // The plaintext stops here; only the salted hash is persisted
        let password_hash = Password::new(&password)?.into_string();
        self.uow.users().create(name, email, password_hash).await
    }

    async fn login(&self, email: String, password: String) -> AppResult<(User, TokenResponse)> {
        let email = normalize_email(&email);
        let user_result = self.uow.users().find_by_email(&email).await?;

        // Always run a verification, against a dummy hash when the user
        // does not exist, so both failure cases cost the same.
        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (DUMMY_PASSWORD_HASH, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        // Uniform error: never reveal which half failed
        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = user_result.ok_or(AppError::InvalidCredentials)?;
        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    fn issue_token(&self, user_id: Uuid) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::days(self.config.jwt_expiration_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_days * SECONDS_PER_DAY,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn resolve_principal(&self, token: &str) -> AppResult<Principal> {
        let claims = self.verify_token(token)?;

        // Re-read the user so the principal carries the current role,
        // not the role at issuance. A token for a vanished user is
        // treated the same as a forged one.
        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(Principal {
            id: user.id,
            role: user.role,
        })
    }
}
