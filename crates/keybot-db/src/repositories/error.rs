//! Error handling utilities for repositories

use keybot_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert a SQLx error to a DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for a unique violation and return the given error, or fall back
/// to a database error. Used to surface the global key-code uniqueness
/// constraint as a checked duplicate condition.
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}
