//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{AdId, CountryId, NumberId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Country not found: {0}")]
    CountryNotFound(CountryId),

    #[error("Number not found: {0}")]
    NumberNotFound(NumberId),

    #[error("Advertisement not found: {0}")]
    AdvertisementNotFound(AdId),

    #[error("Broadcast run not found: {0}")]
    RunNotFound(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Insufficient points: need {required}, have {available}")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("Daily bonus already claimed today")]
    BonusAlreadyClaimed,

    #[error("User is banned: {0}")]
    UserBanned(UserId),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Number already exists: {0}")]
    DuplicateNumber(String),

    #[error("Country already exists: {0}")]
    CountryExists(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::CountryNotFound(_)
                | Self::NumberNotFound(_)
                | Self::AdvertisementNotFound(_)
                | Self::RunNotFound(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateNumber(_) | Self::CountryExists(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::UserNotFound(UserId::new(1)).is_not_found());
        assert!(DomainError::RunNotFound("abc".to_string()).is_not_found());
        assert!(!DomainError::BonusAlreadyClaimed.is_not_found());
    }

    #[test]
    fn test_is_conflict() {
        assert!(DomainError::DuplicateNumber("123".to_string()).is_conflict());
        assert!(!DomainError::UserNotFound(UserId::new(1)).is_conflict());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InsufficientPoints {
            required: 100,
            available: 40,
        };
        assert_eq!(err.to_string(), "Insufficient points: need 100, have 40");
    }
}
