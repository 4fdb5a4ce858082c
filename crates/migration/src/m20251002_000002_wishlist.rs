//! Watchlist of symbols with the price snapshot taken when they were added.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Wishlist {
    Table,
    Id,
    Symbol,
    InitialPrice,
    Note,
    Snapshot,
    AddedAt,
}

pub(crate) fn wishlist_table() -> TableCreateStatement {
    Table::create()
        .table(Wishlist::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Wishlist::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Wishlist::Symbol)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Wishlist::InitialPrice).decimal().not_null())
        .col(ColumnDef::new(Wishlist::Note).text())
        .col(ColumnDef::new(Wishlist::Snapshot).json_binary())
        .col(
            ColumnDef::new(Wishlist::AddedAt)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(wishlist_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wishlist::Table).to_owned())
            .await
    }
}
