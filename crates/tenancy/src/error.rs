//! The module contains the errors the retrofit can report.
//!
//! The errors are:
//!
//! - [`ConstraintViolation`] thrown when a uniqueness or check constraint is
//!   unexpectedly violated, e.g. a concurrent duplicate bootstrap insert.
//! - [`ReferentialIntegrity`] thrown when a table holds `user_id` values
//!   matching no user; the constraint is not installed and the data is left
//!   as found.
//! - [`Connection`] thrown when the database cannot be reached; the whole
//!   retrofit is safe to retry.
//!
//! [`ConstraintViolation`]: RetrofitError::ConstraintViolation
//! [`ReferentialIntegrity`]: RetrofitError::ReferentialIntegrity
//! [`Connection`]: RetrofitError::Connection
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Retrofit custom errors.
#[derive(Error, Debug)]
pub enum RetrofitError {
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
    #[error("\"{table}\" has {orphans} row(s) whose user_id matches no user")]
    ReferentialIntegrity { table: String, orphans: i64 },
    #[error("Database unreachable: {0}")]
    Connection(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for RetrofitError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
            return Self::ConstraintViolation(message);
        }
        match err {
            DbErr::Conn(e) => Self::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => Self::Connection(e.to_string()),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for RetrofitError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ConstraintViolation(a), Self::ConstraintViolation(b)) => a == b,
            (
                Self::ReferentialIntegrity {
                    table: ta,
                    orphans: oa,
                },
                Self::ReferentialIntegrity {
                    table: tb,
                    orphans: ob,
                },
            ) => ta == tb && oa == ob,
            (Self::Connection(a), Self::Connection(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn connection_failures_are_classified() {
        let err = RetrofitError::from(DbErr::Conn(RuntimeErr::Internal(
            "pool timed out".to_string(),
        )));
        assert!(matches!(err, RetrofitError::Connection(_)));
    }

    #[test]
    fn other_database_errors_pass_through() {
        let err = RetrofitError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(
            err,
            RetrofitError::Database(DbErr::Custom("boom".to_string()))
        );
    }
}
