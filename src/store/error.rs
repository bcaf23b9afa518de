//! Store error types.

use thiserror::Error;

/// Errors returned by the store data access layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated a table constraint (duplicate id, missing name).
    #[error("Store constraint violated: {0}")]
    Constraint(String),

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// Opening the database file or its directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(msg.unwrap_or_else(|| err.to_string()))
            }
            other => StoreError::Database(other),
        }
    }
}

impl StoreError {
    /// Returns true for constraint violations.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
