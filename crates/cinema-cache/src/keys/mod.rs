//! Cache key layout

mod otp;

pub use otp::{OtpKeys, COOLDOWN_PREFIX, FAILED_PREFIX, OTP_PREFIX};
