//! The multi-tenancy retrofit.
//!
//! Everything before this migration assumed one implicit owner. This one
//! makes ownership explicit: it creates `users`, seeds the bootstrap
//! account, stamps `user_id` onto every table in
//! [`crate::registry::OWNED_TABLES`], assigns legacy rows to the bootstrap
//! account and installs the cascading foreign keys. Already-migrated tables
//! are recognised and left alone, so replaying is safe.
//!
//! The heavy lifting lives in the `tenancy` crate; this file only binds it
//! to Florin's registry and identity.

use sea_orm_migration::prelude::*;
use tenancy::{BootstrapUser, RetrofitError};

use crate::registry::OWNED_TABLES;

/// Identity legacy rows are assigned to. The hash is pre-computed and
/// stored verbatim; nothing in this workspace can verify it.
pub const BOOTSTRAP_USERNAME: &str = "Deimos";
pub const BOOTSTRAP_PASSWORD_HASH: &str =
    "pbkdf2:sha256:600000$c1d8a6e43b9f5072$7e3b9a1f5c8d2064b7a9e1c3f5d70824\
     a6c8e0b2d4f6183957c1e3a5b7d9f102";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let bootstrap = BootstrapUser {
            username: BOOTSTRAP_USERNAME,
            password_hash: BOOTSTRAP_PASSWORD_HASH,
        };
        tenancy::retrofit_tenancy(manager, &OWNED_TABLES, &bootstrap)
            .await
            .map_err(into_db_err)?
            .into_result()
            .map_err(into_db_err)?;
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Err(DbErr::Migration(
            "ownership cannot be un-assigned; restore from a backup instead".to_owned(),
        ))
    }
}

fn into_db_err(err: RetrofitError) -> DbErr {
    match err {
        RetrofitError::Database(inner) => inner,
        other => DbErr::Migration(other.to_string()),
    }
}
