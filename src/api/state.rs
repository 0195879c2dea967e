//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and
//! infrastructure. The repository handle is constructed once at startup
//! and injected here, never referenced as ambient global state.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{AuthService, BugService, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Bug service
    pub bug_service: Arc<dyn BugService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            bug_service: container.bugs(),
            database,
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        bug_service: Arc<dyn BugService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            bug_service,
            database,
        }
    }
}
