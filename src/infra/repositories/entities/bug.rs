//! Bug database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Bug, BugPriority, BugStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bugs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    pub priority: String,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Bug {
    fn from(model: Model) -> Self {
        Bug {
            id: model.id,
            title: model.title,
            description: model.description,
            status: BugStatus::from(model.status.as_str()),
            priority: BugPriority::from(model.priority.as_str()),
            created_by: model.created_by,
            assigned_to: model.assigned_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
