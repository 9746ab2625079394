//! OTP history model -> entity mapper

use cinema_core::{DomainError, OtpRecord, UserId};

use crate::models::OtpHistoryModel;

impl TryFrom<OtpHistoryModel> for OtpRecord {
    type Error = DomainError;

    fn try_from(model: OtpHistoryModel) -> Result<Self, Self::Error> {
        Ok(OtpRecord {
            id: model.id,
            user_id: UserId::new(model.user_id),
            phone: model.phone,
            code: model.code,
            status: model.status.parse()?,
            failed_attempts: model.failed_attempts,
            created_at: model.created_at,
            verified_at: model.verified_at,
        })
    }
}
