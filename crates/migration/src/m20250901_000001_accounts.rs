//! Baseline bank schema: synced accounts and their booked transactions.
//!
//! `account_id` and `transaction_id` are the bank-side identifiers; the
//! synthetic cash account lives in `accounts` under an app-generated
//! `account_id` like any synced one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Accounts {
    Table,
    Id,
    AccountId,
    Name,
    Iban,
    Balance,
    Currency,
    BankName,
    Type,
    Subtype,
    LastSynced,
}

#[derive(Iden)]
pub(crate) enum Transactions {
    Table,
    Id,
    TransactionId,
    AccountId,
    BookingDate,
    Amount,
    Currency,
    CreditorName,
    DebtorName,
    RemittanceInformation,
    RawJson,
}

pub(crate) fn accounts_table() -> TableCreateStatement {
    Table::create()
        .table(Accounts::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Accounts::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Accounts::AccountId)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Accounts::Name).string().not_null())
        .col(ColumnDef::new(Accounts::Iban).string())
        .col(ColumnDef::new(Accounts::Balance).decimal().not_null().default(0))
        .col(
            ColumnDef::new(Accounts::Currency)
                .string()
                .not_null()
                .default("EUR"),
        )
        .col(ColumnDef::new(Accounts::BankName).string())
        .col(ColumnDef::new(Accounts::Type).string())
        .col(ColumnDef::new(Accounts::Subtype).string())
        .col(ColumnDef::new(Accounts::LastSynced).timestamp_with_time_zone())
        .to_owned()
}

pub(crate) fn transactions_table() -> TableCreateStatement {
    Table::create()
        .table(Transactions::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Transactions::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Transactions::TransactionId)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Transactions::AccountId).string().not_null())
        .col(ColumnDef::new(Transactions::BookingDate).date())
        .col(ColumnDef::new(Transactions::Amount).decimal().not_null())
        .col(
            ColumnDef::new(Transactions::Currency)
                .string()
                .not_null()
                .default("EUR"),
        )
        .col(ColumnDef::new(Transactions::CreditorName).string())
        .col(ColumnDef::new(Transactions::DebtorName).string())
        .col(ColumnDef::new(Transactions::RemittanceInformation).text())
        .col(ColumnDef::new(Transactions::RawJson).json_binary())
        .foreign_key(
            ForeignKey::create()
                .name("fk-transactions-account_id")
                .from(Transactions::Table, Transactions::AccountId)
                .to(Accounts::Table, Accounts::AccountId)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub(crate) fn transactions_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx-transactions-account_id-booking_date")
            .table(Transactions::Table)
            .col(Transactions::AccountId)
            .col(Transactions::BookingDate)
            .to_owned(),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(accounts_table()).await?;
        manager.create_table(transactions_table()).await?;
        for index in transactions_indexes() {
            manager.create_index(index).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
