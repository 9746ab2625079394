//! OTP history database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct OtpHistoryModel {
    pub id: i64,
    pub user_id: i64,
    pub phone: String,
    pub code: String,
    pub status: String,
    pub failed_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}
