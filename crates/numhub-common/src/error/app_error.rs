//! Application error types
//!
//! Unified error handling for the entire application.

use numhub_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Ephemeral state
    #[error("Session expired")]
    SessionExpired,

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Whether the caller can sensibly retry or re-prompt the user
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::InvalidInput(_)
            | Self::NotFound(_)
            | Self::Conflict(_)
            | Self::RateLimitExceeded
            | Self::SessionExpired => true,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) | Self::Config(_) => {
                false
            }
            Self::Domain(e) => e.is_not_found() || e.is_conflict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numhub_core::UserId;

    #[test]
    fn test_recoverable() {
        assert!(AppError::SessionExpired.is_recoverable());
        assert!(AppError::RateLimitExceeded.is_recoverable());
        assert!(!AppError::Database("down".to_string()).is_recoverable());
    }

    #[test]
    fn test_domain_conversion() {
        let err: AppError = DomainError::UserNotFound(UserId::new(1)).into();
        assert!(err.is_recoverable());
        let err: AppError = DomainError::DatabaseError("boom".to_string()).into();
        assert!(!err.is_recoverable());
    }
}
