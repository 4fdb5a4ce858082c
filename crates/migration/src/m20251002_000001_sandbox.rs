//! Paper-trading sandboxes: a play-money balance, the positions bought with
//! it, and the trade log behind those positions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Sandboxes {
    Table,
    Id,
    Name,
    Balance,
    InitialBalance,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum SandboxPortfolio {
    Table,
    Id,
    SandboxId,
    Symbol,
    Quantity,
    AverageBuyPrice,
}

#[derive(Iden)]
pub(crate) enum SandboxTransactions {
    Table,
    Id,
    SandboxId,
    Symbol,
    Type,
    Quantity,
    Price,
    ExecutedAt,
}

pub(crate) fn sandboxes_table() -> TableCreateStatement {
    Table::create()
        .table(Sandboxes::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Sandboxes::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Sandboxes::Name).string().not_null())
        .col(ColumnDef::new(Sandboxes::Balance).decimal().not_null())
        .col(
            ColumnDef::new(Sandboxes::InitialBalance)
                .decimal()
                .not_null(),
        )
        .col(
            ColumnDef::new(Sandboxes::CreatedAt)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

pub(crate) fn sandbox_portfolio_table() -> TableCreateStatement {
    Table::create()
        .table(SandboxPortfolio::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(SandboxPortfolio::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(SandboxPortfolio::SandboxId)
                .integer()
                .not_null(),
        )
        .col(ColumnDef::new(SandboxPortfolio::Symbol).string().not_null())
        .col(
            ColumnDef::new(SandboxPortfolio::Quantity)
                .decimal()
                .not_null(),
        )
        .col(
            ColumnDef::new(SandboxPortfolio::AverageBuyPrice)
                .decimal()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk-sandbox_portfolio-sandbox_id")
                .from(SandboxPortfolio::Table, SandboxPortfolio::SandboxId)
                .to(Sandboxes::Table, Sandboxes::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub(crate) fn sandbox_portfolio_indexes() -> Vec<IndexCreateStatement> {
    // One position per symbol per sandbox.
    vec![
        Index::create()
            .name("idx-sandbox_portfolio-sandbox_id-symbol-unique")
            .table(SandboxPortfolio::Table)
            .col(SandboxPortfolio::SandboxId)
            .col(SandboxPortfolio::Symbol)
            .unique()
            .to_owned(),
    ]
}

pub(crate) fn sandbox_transactions_table() -> TableCreateStatement {
    Table::create()
        .table(SandboxTransactions::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(SandboxTransactions::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(SandboxTransactions::SandboxId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(SandboxTransactions::Symbol)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(SandboxTransactions::Type)
                .string()
                .not_null()
                .check(Expr::col(SandboxTransactions::Type).is_in(["buy", "sell"])),
        )
        .col(
            ColumnDef::new(SandboxTransactions::Quantity)
                .decimal()
                .not_null(),
        )
        .col(ColumnDef::new(SandboxTransactions::Price).decimal().not_null())
        .col(
            ColumnDef::new(SandboxTransactions::ExecutedAt)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk-sandbox_transactions-sandbox_id")
                .from(SandboxTransactions::Table, SandboxTransactions::SandboxId)
                .to(Sandboxes::Table, Sandboxes::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(sandboxes_table()).await?;
        manager.create_table(sandbox_portfolio_table()).await?;
        for index in sandbox_portfolio_indexes() {
            manager.create_index(index).await?;
        }
        manager.create_table(sandbox_transactions_table()).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SandboxTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SandboxPortfolio::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sandboxes::Table).to_owned())
            .await?;
        Ok(())
    }
}
