//! Error handling utilities for repositories

use numhub_core::error::DomainError;
use numhub_core::value_objects::{CountryId, NumberId, UserId};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
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

/// Create a "user not found" error
pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::UserNotFound(id)
}

/// Create a "country not found" error
pub fn country_not_found(id: CountryId) -> DomainError {
    DomainError::CountryNotFound(id)
}

/// Create a "number not found" error
pub fn number_not_found(id: NumberId) -> DomainError {
    DomainError::NumberNotFound(id)
}

/// Create a "run not found" error
pub fn run_not_found(run_id: &str) -> DomainError {
    DomainError::RunNotFound(run_id.to_string())
}
