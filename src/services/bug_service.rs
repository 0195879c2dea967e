//! Bug service - lifecycle contracts and dashboard aggregation.
//!
//! Mutations follow a fixed ordering: the record is looked up first
//! (`NotFound` when absent), then the ownership policy is applied
//! (`Forbidden` when disallowed). The read-modify-write sequence is not
//! isolated against concurrent writers; last write wins.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{can_mutate, Bug, BugFilter, BugPatch, BugStats, NewBug, Principal};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Bug service trait for dependency injection.
#[async_trait]
pub trait BugService: Send + Sync {
    /// Create a bug owned by the principal
    async fn create_bug(&self, input: NewBug, principal: &Principal) -> AppResult<Bug>;

    /// List bugs matching the filter; reads are not ownership-scoped
    async fn list_bugs(&self, filter: &BugFilter) -> AppResult<Vec<Bug>>;

    /// Get a single bug by ID
    async fn get_bug(&self, id: Uuid) -> AppResult<Bug>;

    /// Merge a partial update into a bug the principal may mutate
    async fn update_bug(&self, id: Uuid, patch: BugPatch, principal: &Principal)
        -> AppResult<Bug>;

    /// Delete a bug the principal may mutate
    async fn delete_bug(&self, id: Uuid, principal: &Principal) -> AppResult<()>;

    /// Dashboard counts derived from one repository snapshot
    async fn stats(&self, principal: &Principal) -> AppResult<BugStats>;
}

/// Concrete implementation of BugService using Unit of Work.
pub struct BugTracker<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BugTracker<U> {
    /// Create new bug service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// An assignee, when given, must be a known user. Checked here at the
    /// caller boundary; not enforced transactionally.
    async fn check_assignee(&self, assigned_to: Option<Uuid>) -> AppResult<()> {
        if let Some(assignee) = assigned_to {
            if self.uow.users().find_by_id(assignee).await?.is_none() {
                return Err(AppError::validation(
                    "assignedTo must reference an existing user",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> BugService for BugTracker<U> {
    async fn create_bug(&self, input: NewBug, principal: &Principal) -> AppResult<Bug> {
        input.validate()?;
        self.check_assignee(input.assigned_to).await?;

        self.uow.bugs().create(input, principal.id).await
    }

    async fn list_bugs(&self, filter: &BugFilter) -> AppResult<Vec<Bug>> {
        self.uow.bugs().list(filter).await
    }

    async fn get_bug(&self, id: Uuid) -> AppResult<Bug> {
        self.uow.bugs().find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_bug(
        &self,
        id: Uuid,
        patch: BugPatch,
        principal: &Principal,
    ) -> AppResult<Bug> {
        let bug = self
            .uow
            .bugs()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !can_mutate(principal, &bug) {
            return Err(AppError::Forbidden);
        }

        patch.validate()?;
        self.check_assignee(patch.assigned_to).await?;

        self.uow.bugs().update(id, patch).await
    }

    async fn delete_bug(&self, id: Uuid, principal: &Principal) -> AppResult<()> {
        let bug = self
            .uow
            .bugs()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !can_mutate(principal, &bug) {
            return Err(AppError::Forbidden);
        }

        self.uow.bugs().delete(id).await
    }

    async fn stats(&self, principal: &Principal) -> AppResult<BugStats> {
        // One unfiltered scan; counting over a single snapshot keeps the
        // per-status counts consistent with the total
        let bugs = self.uow.bugs().list(&BugFilter::default()).await?;
        Ok(BugStats::from_snapshot(&bugs, principal.id))
    }
}
