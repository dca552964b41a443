//! Database layer - lazily connected pool, migrations and repositories
//!
//! - One pool per process, established through the connection cache
//! - Rely on DB constraints and handle conflicts, no check-then-insert
//! - Listing queries are single statements

pub mod migrations;
pub mod pool;
pub mod repos;

use std::sync::Arc;

pub use pool::{create_pool, PgCache, PgConnector};
pub use repos::{BookingRepo, EventRepo};

/// Storage error type, shared by every store implementation
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The shared connection attempt failed; every waiter sees the same error
    #[error("database unavailable: {0}")]
    Connection(Arc<sqlx::Error>),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },

    #[error("corrupt row: {0}")]
    Decode(String),
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }
}

/// Map a unique-constraint violation to `Conflict`, pass everything else through.
pub(crate) fn conflict_on_unique(
    err: sqlx::Error,
    resource: &'static str,
    id: &str,
) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Conflict {
            resource,
            id: id.to_owned(),
        },
        _ => DbError::Sqlx(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            DbError::not_found("event", "rust-conf").to_string(),
            "not found: event 'rust-conf'"
        );
        let err = DbError::Conflict {
            resource: "event",
            id: "rust-conf".into(),
        };
        assert_eq!(err.to_string(), "conflict: event 'rust-conf' already exists");
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "event", "x");
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
