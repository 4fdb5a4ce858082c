//! Manual cash movements, kept apart from bank-synced `transactions`.
//! Ids are app-generated strings, not autoincrement.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum CashTransactions {
    Table,
    Id,
    Amount,
    Currency,
    Name,
    Description,
    BookingDate,
}

pub(crate) fn cash_transactions_table() -> TableCreateStatement {
    Table::create()
        .table(CashTransactions::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(CashTransactions::Id)
                .string()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(CashTransactions::Amount).decimal().not_null())
        .col(
            ColumnDef::new(CashTransactions::Currency)
                .string()
                .not_null()
                .default("EUR"),
        )
        .col(ColumnDef::new(CashTransactions::Name).string().not_null())
        .col(ColumnDef::new(CashTransactions::Description).text())
        .col(
            ColumnDef::new(CashTransactions::BookingDate)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(cash_transactions_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CashTransactions::Table).to_owned())
            .await
    }
}
