//! Unit of Work - centralized repository access.
//!
//! Hands the services their repositories from one place so wiring stays
//! in the infrastructure layer. Update and delete intentionally run as
//! plain read-modify-write sequences without a surrounding transaction:
//! concurrent writers to the same record resolve last-write-wins.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{BugRepository, BugStore, UserRepository, UserStore};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get bug repository
    fn bugs(&self) -> Arc<dyn BugRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    bug_repo: Arc<BugStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let bug_repo = Arc::new(BugStore::new(db));
        Self {
            user_repo,
            bug_repo,
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn bugs(&self) -> Arc<dyn BugRepository> {
        self.bug_repo.clone()
    }
}
