//! Database models - SQLx-compatible structs for PostgreSQL tables

mod otp;
mod user;

pub use otp::OtpHistoryModel;
pub use user::UserModel;
