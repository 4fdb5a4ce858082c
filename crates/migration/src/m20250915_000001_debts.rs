//! Debt tracking between the user and known persons.
//!
//! A `debt` is the running total against one person, split into `sub_debts`
//! for individual amounts. Deleting a person takes the whole chain with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Persons {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub(crate) enum Debts {
    Table,
    Id,
    PersonId,
    Type,
    Amount,
    Description,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum SubDebts {
    Table,
    Id,
    DebtId,
    Amount,
    Note,
    CreatedAt,
}

pub(crate) fn persons_table() -> TableCreateStatement {
    Table::create()
        .table(Persons::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Persons::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Persons::Name).string().not_null())
        .to_owned()
}

pub(crate) fn debts_table() -> TableCreateStatement {
    Table::create()
        .table(Debts::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Debts::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Debts::PersonId).integer().not_null())
        .col(
            ColumnDef::new(Debts::Type)
                .string()
                .not_null()
                .check(Expr::col(Debts::Type).is_in(["i_owe", "they_owe"])),
        )
        .col(ColumnDef::new(Debts::Amount).decimal().not_null())
        .col(ColumnDef::new(Debts::Description).string())
        .col(
            ColumnDef::new(Debts::CreatedAt)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk-debts-person_id")
                .from(Debts::Table, Debts::PersonId)
                .to(Persons::Table, Persons::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub(crate) fn sub_debts_table() -> TableCreateStatement {
    Table::create()
        .table(SubDebts::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(SubDebts::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(SubDebts::DebtId).integer().not_null())
        .col(ColumnDef::new(SubDebts::Amount).decimal().not_null())
        .col(ColumnDef::new(SubDebts::Note).string())
        .col(
            ColumnDef::new(SubDebts::CreatedAt)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk-sub_debts-debt_id")
                .from(SubDebts::Table, SubDebts::DebtId)
                .to(Debts::Table, Debts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(persons_table()).await?;
        manager.create_table(debts_table()).await?;
        manager.create_table(sub_debts_table()).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubDebts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await?;
        Ok(())
    }
}
