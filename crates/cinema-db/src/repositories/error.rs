//! Error handling utilities for repositories

use cinema_core::{DomainError, UserId};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Name the identity channel behind a users unique constraint
pub fn identity_conflict(constraint: Option<&str>) -> DomainError {
    let channel = match constraint {
        Some(c) if c.contains("phone") => "phone_number",
        Some(c) if c.contains("email") => "email",
        Some(c) if c.contains("external") => "external_id",
        _ => "identity",
    };
    DomainError::IdentityConflict(channel.to_string())
}

pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::UserNotFound(id)
}
