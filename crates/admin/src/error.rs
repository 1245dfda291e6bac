//! Error types for the admin CLI.

use thiserror::Error;

/// Errors that can occur while running an admin command.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Output serialization error.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
