//! Bug repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::bug::{self, ActiveModel, Entity as BugEntity};
use crate::domain::{Bug, BugFilter, BugPatch, NewBug};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Bug repository trait for dependency injection.
///
/// Listings return the full matching set ordered by `created_at`
/// descending; there is deliberately no pagination at this layer.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BugRepository: Send + Sync {
    /// Persist a new bug, generating id and timestamps
    async fn create(&self, input: NewBug, created_by: Uuid) -> AppResult<Bug>;

    /// Find bug by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>>;

    /// List bugs matching the filter, most recently created first
    async fn list(&self, filter: &BugFilter) -> AppResult<Vec<Bug>>;

    /// Merge patch fields into an existing bug, bumping `updated_at`
    async fn update(&self, id: Uuid, patch: BugPatch) -> AppResult<Bug>;

    /// Remove a bug permanently
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of BugRepository backed by SeaORM
pub struct BugStore {
    db: DatabaseConnection,
}

impl BugStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BugRepository for BugStore {
    async fn create(&self, input: NewBug, created_by: Uuid) -> AppResult<Bug> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            description: Set(input.description),
            status: Set(input.status.to_string()),
            priority: Set(input.priority.to_string()),
            created_by: Set(created_by),
            assigned_to: Set(input.assigned_to),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Bug::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>> {
        let result = BugEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Bug::from))
    }

    async fn list(&self, filter: &BugFilter) -> AppResult<Vec<Bug>> {
        let mut query = BugEntity::find();

        if let Some(status) = filter.status {
            query = query.filter(bug::Column::Status.eq(status.to_string()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(bug::Column::Priority.eq(priority.to_string()));
        }
        if let Some(assigned_to) = filter.assigned_to {
            query = query.filter(bug::Column::AssignedTo.eq(assigned_to));
        }

        let models = query
            .order_by_desc(bug::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Bug::from).collect())
    }

    async fn update(&self, id: Uuid, patch: BugPatch) -> AppResult<Bug> {
        let existing = BugEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.to_string());
        }
        if let Some(priority) = patch.priority {
            active.priority = Set(priority.to_string());
        }
        if let Some(assigned_to) = patch.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Bug::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = BugEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
