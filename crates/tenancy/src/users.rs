//! The `users` table and the bootstrap account.
use sea_orm::ConnectionTrait;
use sea_orm_migration::{SchemaManagerConnection, prelude::*};

use crate::ResultRetrofit;
use crate::tables::BootstrapUser;

#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}

/// Creates the `users` table when it does not exist yet.
///
/// Pre-retrofit databases have no notion of a user at all, so the retrofit
/// brings its own DDL for it.
pub async fn ensure_users_table(manager: &SchemaManager<'_>) -> ResultRetrofit<()> {
    manager
        .create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Users::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(Users::Username)
                        .string_len(255)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                .col(
                    ColumnDef::new(Users::CreatedAt)
                        .timestamp_with_time_zone()
                        .default(Expr::current_timestamp()),
                )
                .to_owned(),
        )
        .await?;
    Ok(())
}

/// Inserts the bootstrap account unless a user with that username already
/// exists, and resolves its id.
///
/// First write wins: an existing row keeps its password hash untouched, so
/// re-running the retrofit with rotated credentials never locks out the
/// account that legacy rows were assigned to.
pub async fn ensure_bootstrap_user(
    manager: &SchemaManager<'_>,
    bootstrap: &BootstrapUser<'_>,
) -> ResultRetrofit<i32> {
    let db = manager.get_connection();

    if let Some(id) = lookup_user_id(db, bootstrap.username).await? {
        tracing::debug!("bootstrap user {} already present", bootstrap.username);
        return Ok(id);
    }

    let backend = db.get_database_backend();
    let insert = Query::insert()
        .into_table(Users::Table)
        .columns([Users::Username, Users::PasswordHash])
        .values_panic([bootstrap.username.into(), bootstrap.password_hash.into()])
        .to_owned();
    db.execute(backend.build(&insert)).await?;
    tracing::info!("created bootstrap user {}", bootstrap.username);

    match lookup_user_id(db, bootstrap.username).await? {
        Some(id) => Ok(id),
        None => Err(DbErr::Custom(format!(
            "bootstrap user \"{}\" missing right after insert",
            bootstrap.username
        ))
        .into()),
    }
}

async fn lookup_user_id(
    db: &SchemaManagerConnection<'_>,
    username: &str,
) -> ResultRetrofit<Option<i32>> {
    let backend = db.get_database_backend();
    let select = Query::select()
        .column(Users::Id)
        .from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .to_owned();
    match db.query_one(backend.build(&select)).await? {
        Some(row) => Ok(Some(row.try_get("", "id")?)),
        None => Ok(None),
    }
}
