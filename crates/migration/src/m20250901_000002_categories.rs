use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Categories {
    Table,
    Id,
    Name,
    Color,
    Icon,
}

pub(crate) fn categories_table() -> TableCreateStatement {
    Table::create()
        .table(Categories::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Categories::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Categories::Name)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Categories::Color).string())
        .col(ColumnDef::new(Categories::Icon).string())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(categories_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
