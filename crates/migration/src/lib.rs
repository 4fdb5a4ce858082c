pub use sea_orm_migration::prelude::*;

mod m20250901_000001_accounts;
mod m20250901_000002_categories;
mod m20250908_000001_cash_transactions;
mod m20250915_000001_debts;
mod m20251002_000001_sandbox;
mod m20251002_000002_wishlist;
mod m20251010_000001_budget_settings;
mod m20260110_000001_tenancy;
mod m20260124_000001_sharing;
pub mod registry;

pub use m20260110_000001_tenancy::{BOOTSTRAP_PASSWORD_HASH, BOOTSTRAP_USERNAME};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_accounts::Migration),
            Box::new(m20250901_000002_categories::Migration),
            Box::new(m20250908_000001_cash_transactions::Migration),
            Box::new(m20250915_000001_debts::Migration),
            Box::new(m20251002_000001_sandbox::Migration),
            Box::new(m20251002_000002_wishlist::Migration),
            Box::new(m20251010_000001_budget_settings::Migration),
            Box::new(m20260110_000001_tenancy::Migration),
            Box::new(m20260124_000001_sharing::Migration),
        ]
    }
}
