use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::*;
use tenancy::{BootstrapUser, owner_state, retrofit_tenancy};

use migration::registry::OWNED_TABLES;
use migration::{BOOTSTRAP_PASSWORD_HASH, BOOTSTRAP_USERNAME, Migrator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./florin.db?mode=rwc".to_string());

    // One connection only: the SQLite constraint installer scopes pragmas to
    // its connection, and a one-shot batch tool has no use for a pool.
    let mut options = ConnectOptions::new(db_url);
    options.max_connections(1);
    let db = Database::connect(options).await?;

    match cmd.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, None).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "status" => {
            Migrator::status(&db).await?;
        }
        "retrofit" => retrofit(&db).await?,
        "tenancy" => tenancy_status(&db).await?,
        _ => {
            eprintln!("Usage: cargo run -p migration -- [up|down|fresh|status|retrofit|tenancy]");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Runs the ownership retrofit directly, outside the migration ledger. For
/// databases that predate the ledger and were kept in shape by hand.
async fn retrofit(db: &DatabaseConnection) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let username = std::env::var("BOOTSTRAP_USERNAME")
        .unwrap_or_else(|_| BOOTSTRAP_USERNAME.to_string());
    let password_hash = std::env::var("BOOTSTRAP_PASSWORD_HASH")
        .unwrap_or_else(|_| BOOTSTRAP_PASSWORD_HASH.to_string());
    let bootstrap = BootstrapUser {
        username: &username,
        password_hash: &password_hash,
    };

    let manager = SchemaManager::new(db);
    let report = retrofit_tenancy(&manager, &OWNED_TABLES, &bootstrap).await?;
    for outcome in &report.tables {
        match &outcome.error {
            Some(error) => println!("{:<22} FAILED: {error}", outcome.table),
            None => println!(
                "{:<22} {} ({} row(s) assigned)",
                outcome.table, outcome.state, outcome.rows_backfilled
            ),
        }
    }
    if !report.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

/// Prints where each owned table stands in the retrofit.
async fn tenancy_status(
    db: &DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let manager = SchemaManager::new(db);
    for table in &OWNED_TABLES {
        let state = owner_state(&manager, table).await?;
        println!("{:<22} {state}", table.name);
    }
    Ok(())
}
