//! Keys for phone OTP state
//!
//! - `otp:{user_id}:{phone}` - the issued code
//! - `otp_request:{phone}` - request cooldown marker, per phone across users
//! - `otp_failed:{user_id}:{phone}` - failed attempt counter

use cinema_core::UserId;

pub const OTP_PREFIX: &str = "otp:";
pub const COOLDOWN_PREFIX: &str = "otp_request:";
pub const FAILED_PREFIX: &str = "otp_failed:";

pub struct OtpKeys;

impl OtpKeys {
    #[must_use]
    pub fn code(user_id: UserId, phone: &str) -> String {
        format!("{OTP_PREFIX}{user_id}:{phone}")
    }

    #[must_use]
    pub fn cooldown(phone: &str) -> String {
        format!("{COOLDOWN_PREFIX}{phone}")
    }

    #[must_use]
    pub fn failed_attempts(user_id: UserId, phone: &str) -> String {
        format!("{FAILED_PREFIX}{user_id}:{phone}")
    }
}
