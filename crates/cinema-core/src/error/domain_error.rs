//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::UserId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("At least one of phone number, email, or external id is required")]
    MissingIdentity,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    /// Unique constraint on an identity channel rejected the write
    #[error("Identity already in use: {0}")]
    IdentityConflict(String),

    #[error("Phone number is already bound to another user")]
    PhoneAlreadyBound,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::MissingIdentity => "MISSING_IDENTITY",

            Self::IdentityConflict(_) => "IDENTITY_CONFLICT",
            Self::PhoneAlreadyBound => "PHONE_ALREADY_BOUND",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidRole(_) | Self::MissingIdentity
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::IdentityConflict(_) | Self::PhoneAlreadyBound)
    }

    /// Check if this error came from a collaborator (store or cache)
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::CacheError(_))
    }
}
