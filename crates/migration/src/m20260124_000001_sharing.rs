//! Social layer on top of tenancy: friendships between users and sandboxes
//! shared with friends.
//!
//! Neither table is owned by a single user, so they stay outside the
//! retrofit registry; they reference `users` directly and ride on its
//! cascades.

use sea_orm_migration::prelude::*;

use crate::m20251002_000001_sandbox::Sandboxes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Friendships {
    Table,
    Id,
    RequesterId,
    AddresseeId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SandboxShares {
    Table,
    Id,
    SandboxId,
    OwnerId,
    SharedWithId,
    Permission,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Friendships::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Friendships::RequesterId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Friendships::AddresseeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Friendships::Status)
                            .string()
                            .not_null()
                            .default("pending")
                            .check(Expr::col(Friendships::Status).is_in([
                                "pending",
                                "accepted",
                                "rejected",
                            ])),
                    )
                    .col(
                        ColumnDef::new(Friendships::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Friendships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-friendships-requester_id")
                            .from(Friendships::Table, Friendships::RequesterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-friendships-addressee_id")
                            .from(Friendships::Table, Friendships::AddresseeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-friendships-requester_id-addressee_id-unique")
                    .table(Friendships::Table)
                    .col(Friendships::RequesterId)
                    .col(Friendships::AddresseeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SandboxShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SandboxShares::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SandboxShares::SandboxId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SandboxShares::OwnerId).integer().not_null())
                    .col(
                        ColumnDef::new(SandboxShares::SharedWithId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SandboxShares::Permission)
                            .string()
                            .not_null()
                            .default("watch")
                            .check(Expr::col(SandboxShares::Permission).is_in(["watch", "edit"])),
                    )
                    .col(
                        ColumnDef::new(SandboxShares::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sandbox_shares-sandbox_id")
                            .from(SandboxShares::Table, SandboxShares::SandboxId)
                            .to(Sandboxes::Table, Sandboxes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sandbox_shares-owner_id")
                            .from(SandboxShares::Table, SandboxShares::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sandbox_shares-shared_with_id")
                            .from(SandboxShares::Table, SandboxShares::SharedWithId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sandbox_shares-sandbox_id-shared_with_id-unique")
                    .table(SandboxShares::Table)
                    .col(SandboxShares::SandboxId)
                    .col(SandboxShares::SharedWithId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SandboxShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Friendships::Table).to_owned())
            .await?;
        Ok(())
    }
}
