//! Descriptors for the tables the retrofit operates on.
use sea_orm_migration::prelude::*;

/// Name of the owner column added to every owned table.
pub const OWNER_COLUMN: &str = "user_id";

/// Deterministic name of the ownership foreign key for `table`.
pub fn constraint_name(table: &str) -> String {
    format!("fk_{table}_user_id")
}

/// One table whose rows belong to a user.
///
/// The retrofit consumes the table name and the natural key it can count
/// rows by. `columns`, `create` and `indexes` describe the table's baseline
/// shape (without `user_id`); they are only exercised by storage engines
/// that cannot attach a foreign key to an existing table and have to rebuild
/// it instead.
///
/// The list of owned tables is plain configuration data: adding one means
/// adding a descriptor, not touching the operations.
#[derive(Debug, Clone, Copy)]
pub struct OwnedTable {
    pub name: &'static str,
    pub natural_key: &'static str,
    pub columns: &'static [&'static str],
    pub create: fn() -> TableCreateStatement,
    pub indexes: fn() -> Vec<IndexCreateStatement>,
}

impl OwnedTable {
    pub const fn new(
        name: &'static str,
        natural_key: &'static str,
        columns: &'static [&'static str],
        create: fn() -> TableCreateStatement,
        indexes: fn() -> Vec<IndexCreateStatement>,
    ) -> Self {
        Self {
            name,
            natural_key,
            columns,
            create,
            indexes,
        }
    }
}

/// The single account legacy rows are assigned to.
///
/// The hash is an opaque, pre-computed credential string; it is stored
/// verbatim and never interpreted here.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}
