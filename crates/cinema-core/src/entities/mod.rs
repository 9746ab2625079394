//! Domain entities - core business objects

mod identity;
mod otp;
mod role;
mod user;

pub use identity::{Credential, IdentityCandidate};
pub use otp::{OtpRecord, OtpStatus};
pub use role::{
    Role, RoleDetails, RoleExtension, DEFAULT_ADMIN_LEVEL, DEFAULT_LOYALTY_POINTS,
    DEFAULT_STAFF_DEPT,
};
pub use user::User;
