//! Migration: Create the bugs table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bugs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bugs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bugs::Title).string().not_null())
                    .col(ColumnDef::new(Bugs::Description).text().not_null())
                    .col(ColumnDef::new(Bugs::Status).string().not_null())
                    .col(ColumnDef::new(Bugs::Priority).string().not_null())
                    .col(ColumnDef::new(Bugs::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Bugs::AssignedTo).uuid().null())
                    .col(
                        ColumnDef::new(Bugs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bugs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_created_by")
                            .from(Bugs::Table, Bugs::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_assigned_to")
                            .from(Bugs::Table, Bugs::AssignedTo)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Listings are served newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_bugs_created_at")
                    .table(Bugs::Table)
                    .col(Bugs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bugs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bugs {
    Table,
    Id,
    Title,
    Description,
    Status,
    Priority,
    CreatedBy,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
