//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in cinema-core.

mod error;
mod otp;
mod role_extension;
mod user;

pub use otp::PgOtpHistoryRepository;
pub use role_extension::PgRoleExtensionRepository;
pub use user::PgUserRepository;
