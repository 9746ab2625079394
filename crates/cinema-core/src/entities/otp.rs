//! OTP history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::UserId;

/// Lifecycle: `Sent` → `Verified` | `Failed`, or swept to `Expired`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpStatus {
    Sent,
    Verified,
    Failed,
    Expired,
}

impl OtpStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Verified => "VERIFIED",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for OtpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SENT" => Ok(Self::Sent),
            "VERIFIED" => Ok(Self::Verified),
            "FAILED" => Ok(Self::Failed),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(DomainError::ValidationError(format!(
                "unknown otp status: {other}"
            ))),
        }
    }
}

/// One issued code. Several rows may exist per (user, phone).
#[derive(Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: i64,
    pub user_id: UserId,
    pub phone: String,
    pub code: String,
    pub status: OtpStatus,
    pub failed_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for OtpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpRecord")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("phone", &self.phone)
            .field("code", &"[REDACTED]")
            .field("status", &self.status)
            .field("failed_attempts", &self.failed_attempts)
            .field("created_at", &self.created_at)
            .field("verified_at", &self.verified_at)
            .finish()
    }
}
