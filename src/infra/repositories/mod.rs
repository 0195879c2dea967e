//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod bug_repository;
pub(crate) mod entities;
mod user_repository;

pub use bug_repository::{BugRepository, BugStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use bug_repository::MockBugRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
