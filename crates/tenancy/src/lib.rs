//! Multi-tenancy retrofit toolkit for the Florin database.
//!
//! The schema started out single-user: every row implicitly belonged to the
//! one person running the app. This crate turns that implicit ownership into
//! an explicit `user_id` on each owned table, in three ordered steps per
//! table:
//!
//! 1. [`ensure_owner_column`] adds a nullable integer `user_id` if missing.
//! 2. [`backfill_owner`] assigns still-unowned rows to a default user.
//! 3. [`install_ownership_constraint`] enforces `user_id -> users.id` with
//!    a cascading foreign key, only once the data is clean.
//!
//! [`retrofit_tenancy`] runs the full sequence over a configured list of
//! [`OwnedTable`] descriptors, creating the `users` table and the bootstrap
//! account first. Every step is idempotent, so the whole procedure can be
//! re-run against a half-migrated database and simply advances each table to
//! [`OwnerState::Constrained`].
//!
//! The crate knows nothing about Florin's concrete tables; callers pass the
//! descriptors in.

pub use constraint::{constraint_installed, install_ownership_constraint};
pub use error::RetrofitError;
pub use owner::{backfill_owner, ensure_owner_column};
pub use retrofit::{RetrofitReport, TableOutcome, retrofit_tenancy};
pub use state::{OwnerState, owner_state};
pub use tables::{BootstrapUser, OWNER_COLUMN, OwnedTable, constraint_name};
pub use users::{ensure_bootstrap_user, ensure_users_table};

mod constraint;
mod error;
mod owner;
mod retrofit;
mod state;
mod tables;
mod users;

pub(crate) type ResultRetrofit<T> = Result<T, RetrofitError>;
