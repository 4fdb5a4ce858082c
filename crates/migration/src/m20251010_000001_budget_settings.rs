use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum BudgetSettings {
    Table,
    Id,
    MonthlyLimit,
    Currency,
    UpdatedAt,
}

pub(crate) fn budget_settings_table() -> TableCreateStatement {
    Table::create()
        .table(BudgetSettings::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(BudgetSettings::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(BudgetSettings::MonthlyLimit)
                .decimal()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(BudgetSettings::Currency)
                .string()
                .not_null()
                .default("EUR"),
        )
        .col(
            ColumnDef::new(BudgetSettings::UpdatedAt)
                .timestamp_with_time_zone()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(budget_settings_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetSettings::Table).to_owned())
            .await
    }
}
