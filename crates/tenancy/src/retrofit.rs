//! Orchestration of the full retrofit across the configured tables.
use sea_orm_migration::SchemaManager;

use crate::ResultRetrofit;
use crate::constraint::install_ownership_constraint;
use crate::error::RetrofitError;
use crate::owner::{backfill_owner, ensure_owner_column};
use crate::state::OwnerState;
use crate::tables::{BootstrapUser, OwnedTable};
use crate::users::{ensure_bootstrap_user, ensure_users_table};

/// What happened to one table during a retrofit run.
#[derive(Debug)]
pub struct TableOutcome {
    pub table: &'static str,
    /// Furthest state the table reached in this run.
    pub state: OwnerState,
    /// Whether this run added the owner column (false on replays).
    pub column_added: bool,
    /// Rows assigned to the default owner in this run (zero on replays).
    pub rows_backfilled: u64,
    /// The failure that stopped this table, if any; later phases skip a
    /// failed table instead of piling errors on top of it.
    pub error: Option<RetrofitError>,
}

impl TableOutcome {
    fn pending(table: &'static str) -> Self {
        Self {
            table,
            state: OwnerState::NoColumn,
            column_added: false,
            rows_backfilled: 0,
            error: None,
        }
    }

    fn fail(&mut self, error: RetrofitError) {
        tracing::error!("{}: {}", self.table, error);
        self.error = Some(error);
    }
}

/// Aggregated result of one [`retrofit_tenancy`] run.
#[derive(Debug)]
pub struct RetrofitReport {
    /// Id of the bootstrap user legacy rows were assigned to.
    pub default_user_id: i32,
    pub tables: Vec<TableOutcome>,
}

impl RetrofitReport {
    /// Every table ended up constrained.
    pub fn is_complete(&self) -> bool {
        self.tables
            .iter()
            .all(|outcome| outcome.state == OwnerState::Constrained)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|outcome| outcome.error.is_some())
    }

    /// Collapses the report into the first per-table failure, for callers
    /// that need the run to be all-or-nothing (the versioned migration).
    pub fn into_result(mut self) -> ResultRetrofit<RetrofitReport> {
        for outcome in &mut self.tables {
            if let Some(error) = outcome.error.take() {
                return Err(error);
            }
        }
        Ok(self)
    }
}

/// Runs the whole retrofit: users table, bootstrap account, then three
/// passes over `tables` (columns, backfills, constraints).
///
/// The passes are deliberately separated so that no constraint is ever
/// enforced while another table still waits for its backfill. A table that
/// fails in one pass is reported and skipped in the later passes; the
/// remaining tables still advance. Failing to resolve the bootstrap account
/// aborts the run, since there is no owner to assign.
pub async fn retrofit_tenancy(
    manager: &SchemaManager<'_>,
    tables: &[OwnedTable],
    bootstrap: &BootstrapUser<'_>,
) -> ResultRetrofit<RetrofitReport> {
    ensure_users_table(manager).await?;
    let default_user_id = ensure_bootstrap_user(manager, bootstrap).await?;
    tracing::info!(
        "retrofitting {} table(s), default owner {}",
        tables.len(),
        default_user_id
    );

    let mut outcomes: Vec<TableOutcome> = tables
        .iter()
        .map(|table| TableOutcome::pending(table.name))
        .collect();

    for (table, outcome) in tables.iter().zip(outcomes.iter_mut()) {
        match ensure_owner_column(manager, table).await {
            Ok(added) => {
                outcome.column_added = added;
                outcome.state = OwnerState::ColumnAdded;
            }
            Err(error) => outcome.fail(error),
        }
    }

    for (table, outcome) in tables.iter().zip(outcomes.iter_mut()) {
        if outcome.error.is_some() {
            continue;
        }
        match backfill_owner(manager, table, default_user_id).await {
            Ok(rows) => {
                outcome.rows_backfilled = rows;
                outcome.state = OwnerState::Backfilled;
            }
            Err(error) => outcome.fail(error),
        }
    }

    for (table, outcome) in tables.iter().zip(outcomes.iter_mut()) {
        if outcome.error.is_some() {
            continue;
        }
        match install_ownership_constraint(manager, table).await {
            Ok(()) => outcome.state = OwnerState::Constrained,
            Err(error) => outcome.fail(error),
        }
    }

    let report = RetrofitReport {
        default_user_id,
        tables: outcomes,
    };
    if report.is_complete() {
        tracing::info!("retrofit complete");
    }
    Ok(report)
}
