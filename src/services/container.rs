//! Service Container - centralized service wiring.
//!
//! Builds every service from one database connection and hands them out
//! as trait objects, so the HTTP layer depends on abstractions only.

use std::sync::Arc;

use super::{AuthService, Authenticator, BugService, BugTracker, UserManager, UserService};
use crate::config::Config;
use crate::infra::Persistence;

/// Concrete service container
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    bug_service: Arc<dyn BugService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        bug_service: Arc<dyn BugService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            bug_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let user_service = Arc::new(UserManager::new(uow.clone()));
        let bug_service = Arc::new(BugTracker::new(uow));

        Self {
            auth_service,
            user_service,
            bug_service,
        }
    }

    /// Get authentication service
    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    /// Get user service
    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    /// Get bug service
    pub fn bugs(&self) -> Arc<dyn BugService> {
        self.bug_service.clone()
    }
}
