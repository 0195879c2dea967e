//! User service - profile and user-listing use cases.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Password, ProfileUpdate, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user by ID
    async fn get_profile(&self, id: Uuid) -> AppResult<User>;

    /// Apply self-service profile changes (name, email, password)
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_profile(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let current = self
            .uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        // An email change goes through the same normalization and
        // uniqueness check as registration
        let email = match update.email {
            Some(raw) => {
                let email = raw.trim().to_lowercase();
                if email != current.email {
                    if self.uow.users().find_by_email(&email).await?.is_some() {
                        return Err(AppError::DuplicateEmail);
                    }
                    Some(email)
                } else {
                    None
                }
            }
            None => None,
        };

        let password_hash = match update.password {
            Some(plain) => Some(Password::new(&plain)?.into_string()),
            None => None,
        };

        self.uow
            .users()
            .update(id, update.name, email, password_hash)
            .await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }
}
