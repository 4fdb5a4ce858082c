//! Read-only view of how far a table has come in the retrofit.
use std::fmt;

use sea_orm::ConnectionTrait;
use sea_orm_migration::{SchemaManagerConnection, prelude::*};

use crate::ResultRetrofit;
use crate::constraint::constraint_installed;
use crate::owner::ensure_table_exists;
use crate::tables::{OWNER_COLUMN, OwnedTable};

/// Position of one owned table in the retrofit sequence.
///
/// Transitions only move forward; replaying the retrofit advances a table
/// from wherever it stands to [`Constrained`] and then leaves it alone.
///
/// [`Constrained`]: OwnerState::Constrained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerState {
    /// The table has no `user_id` column yet.
    NoColumn,
    /// The column exists but some rows still have no owner.
    ColumnAdded,
    /// Every row has an owner; the foreign key is not in place yet.
    Backfilled,
    /// The cascading foreign key is installed.
    Constrained,
}

impl fmt::Display for OwnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoColumn => "no owner column",
            Self::ColumnAdded => "column added, rows unassigned",
            Self::Backfilled => "backfilled",
            Self::Constrained => "constrained",
        };
        write!(f, "{label}")
    }
}

/// Reports where `table` currently stands.
///
/// An empty table with the column counts as [`OwnerState::Backfilled`]:
/// there is nothing left to assign.
pub async fn owner_state(
    manager: &SchemaManager<'_>,
    table: &OwnedTable,
) -> ResultRetrofit<OwnerState> {
    ensure_table_exists(manager, table).await?;

    if !manager.has_column(table.name, OWNER_COLUMN).await? {
        return Ok(OwnerState::NoColumn);
    }
    if constraint_installed(manager, table).await? {
        return Ok(OwnerState::Constrained);
    }
    if unowned_rows(manager.get_connection(), table).await? > 0 {
        return Ok(OwnerState::ColumnAdded);
    }
    Ok(OwnerState::Backfilled)
}

async fn unowned_rows(
    db: &SchemaManagerConnection<'_>,
    table: &OwnedTable,
) -> ResultRetrofit<i64> {
    let backend = db.get_database_backend();
    let select = Query::select()
        .expr_as(Expr::col(Alias::new(table.natural_key)).count(), Alias::new("n"))
        .from(Alias::new(table.name))
        .and_where(Expr::col(Alias::new(OWNER_COLUMN)).is_null())
        .to_owned();
    match db.query_one(backend.build(&select)).await? {
        Some(row) => Ok(row.try_get("", "n")?),
        None => Ok(0),
    }
}
