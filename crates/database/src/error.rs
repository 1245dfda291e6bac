//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique column already holds this value
    #[error("{entity} with {field} {value} already exists")]
    UniquenessViolation {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// A reference points at a row that does not exist
    #[error("referenced {entity} does not exist: {id}")]
    ReferentialIntegrityViolation { entity: &'static str, id: i64 },

    /// Value outside an enumerated set
    #[error("invalid {field}: {value}")]
    ConstraintViolation { field: &'static str, value: String },

    /// Appointment is already canceled
    #[error("appointment {id} is already canceled")]
    AlreadyCanceled { id: i64 },

    /// Input rejected before reaching the database
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
