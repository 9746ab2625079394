//! Model → entity mappers
//!
//! Conversions are fallible: a row can hold a role id or status string the
//! domain does not know, which surfaces as a `DomainError` instead of a panic.

mod otp;
mod user;

pub use user::UserWrite;
