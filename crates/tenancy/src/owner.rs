//! Per-table owner column: add and backfill.
use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

use crate::ResultRetrofit;
use crate::tables::{OWNER_COLUMN, OwnedTable};

/// Adds the nullable integer owner column to `table` when it is missing.
///
/// Returns whether the column was actually added. Calling this on a table
/// that already carries the column is a no-op, so the retrofit can be
/// replayed freely.
pub async fn ensure_owner_column(
    manager: &SchemaManager<'_>,
    table: &OwnedTable,
) -> ResultRetrofit<bool> {
    ensure_table_exists(manager, table).await?;

    if manager.has_column(table.name, OWNER_COLUMN).await? {
        tracing::debug!("{} already carries {}", table.name, OWNER_COLUMN);
        return Ok(false);
    }

    manager
        .alter_table(
            Table::alter()
                .table(Alias::new(table.name))
                .add_column(ColumnDef::new(Alias::new(OWNER_COLUMN)).integer())
                .to_owned(),
        )
        .await?;
    tracing::info!("added {} to {}", OWNER_COLUMN, table.name);
    Ok(true)
}

/// Assigns `default_user_id` to every row of `table` that has no owner yet.
///
/// Only null values are touched: rows that already belong to someone, for
/// example through application writes between two retrofit runs, keep their
/// owner. Returns the number of rows updated, which is zero on a replay.
pub async fn backfill_owner(
    manager: &SchemaManager<'_>,
    table: &OwnedTable,
    default_user_id: i32,
) -> ResultRetrofit<u64> {
    let db = manager.get_connection();
    let backend = db.get_database_backend();

    let update = Query::update()
        .table(Alias::new(table.name))
        .value(Alias::new(OWNER_COLUMN), default_user_id)
        .and_where(Expr::col(Alias::new(OWNER_COLUMN)).is_null())
        .to_owned();
    let result = db.execute(backend.build(&update)).await?;

    let rows = result.rows_affected();
    if rows > 0 {
        tracing::info!(
            "assigned {} unowned row(s) of {} to user {}",
            rows,
            table.name,
            default_user_id
        );
    }
    Ok(rows)
}

pub(crate) async fn ensure_table_exists(
    manager: &SchemaManager<'_>,
    table: &OwnedTable,
) -> ResultRetrofit<()> {
    if manager.has_table(table.name).await? {
        return Ok(());
    }
    Err(DbErr::Custom(format!("owned table \"{}\" does not exist", table.name)).into())
}
