//! # cinema-core
//!
//! Domain layer for the cinema identity service: users, role extensions,
//! identity candidates, OTP history records, and the repository/cache ports
//! the service layer depends on.
//! This crate has zero dependencies on infrastructure (database, cache client, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Credential, IdentityCandidate, OtpRecord, OtpStatus, Role, RoleDetails, RoleExtension, User,
    DEFAULT_ADMIN_LEVEL, DEFAULT_LOYALTY_POINTS, DEFAULT_STAFF_DEPT,
};
pub use error::DomainError;
pub use traits::{
    KeyValueCache, OtpHistoryRepository, RepoResult, RoleExtensionRepository, UserRepository,
};
pub use value_objects::{normalize_email, normalize_text, UserId, UserIdParseError};
