//! The ordered sequence of tables the tenancy retrofit owns.
//!
//! Each entry pairs a table with its baseline shape so engines that rebuild
//! tables can recreate them faithfully. Bringing a new table under ownership
//! is a data change here (plus its baseline migration), not new code.

use sea_orm_migration::prelude::*;
use tenancy::OwnedTable;

use crate::m20250901_000001_accounts::{accounts_table, transactions_indexes, transactions_table};
use crate::m20250901_000002_categories::categories_table;
use crate::m20250908_000001_cash_transactions::cash_transactions_table;
use crate::m20250915_000001_debts::{debts_table, persons_table, sub_debts_table};
use crate::m20251002_000001_sandbox::{
    sandbox_portfolio_indexes, sandbox_portfolio_table, sandbox_transactions_table,
    sandboxes_table,
};
use crate::m20251002_000002_wishlist::wishlist_table;
use crate::m20251010_000001_budget_settings::budget_settings_table;

fn no_indexes() -> Vec<IndexCreateStatement> {
    Vec::new()
}

pub const OWNED_TABLES: [OwnedTable; 12] = [
    OwnedTable::new(
        "accounts",
        "id",
        &[
            "id",
            "account_id",
            "name",
            "iban",
            "balance",
            "currency",
            "bank_name",
            "type",
            "subtype",
            "last_synced",
        ],
        accounts_table,
        no_indexes,
    ),
    OwnedTable::new(
        "transactions",
        "id",
        &[
            "id",
            "transaction_id",
            "account_id",
            "booking_date",
            "amount",
            "currency",
            "creditor_name",
            "debtor_name",
            "remittance_information",
            "raw_json",
        ],
        transactions_table,
        transactions_indexes,
    ),
    OwnedTable::new(
        "categories",
        "id",
        &["id", "name", "color", "icon"],
        categories_table,
        no_indexes,
    ),
    OwnedTable::new(
        "cash_transactions",
        "id",
        &["id", "amount", "currency", "name", "description", "booking_date"],
        cash_transactions_table,
        no_indexes,
    ),
    OwnedTable::new(
        "debts",
        "id",
        &["id", "person_id", "type", "amount", "description", "created_at"],
        debts_table,
        no_indexes,
    ),
    OwnedTable::new(
        "persons",
        "id",
        &["id", "name"],
        persons_table,
        no_indexes,
    ),
    OwnedTable::new(
        "sub_debts",
        "id",
        &["id", "debt_id", "amount", "note", "created_at"],
        sub_debts_table,
        no_indexes,
    ),
    OwnedTable::new(
        "sandboxes",
        "id",
        &["id", "name", "balance", "initial_balance", "created_at"],
        sandboxes_table,
        no_indexes,
    ),
    OwnedTable::new(
        "sandbox_portfolio",
        "id",
        &["id", "sandbox_id", "symbol", "quantity", "average_buy_price"],
        sandbox_portfolio_table,
        sandbox_portfolio_indexes,
    ),
    OwnedTable::new(
        "sandbox_transactions",
        "id",
        &[
            "id",
            "sandbox_id",
            "symbol",
            "type",
            "quantity",
            "price",
            "executed_at",
        ],
        sandbox_transactions_table,
        no_indexes,
    ),
    OwnedTable::new(
        "wishlist",
        "id",
        &["id", "symbol", "initial_price", "note", "snapshot", "added_at"],
        wishlist_table,
        no_indexes,
    ),
    OwnedTable::new(
        "budget_settings",
        "id",
        &["id", "monthly_limit", "currency", "updated_at"],
        budget_settings_table,
        no_indexes,
    ),
];
