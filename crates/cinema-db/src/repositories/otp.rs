//! PostgreSQL implementation of OtpHistoryRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use cinema_core::traits::{OtpHistoryRepository, RepoResult};
use cinema_core::{OtpRecord, UserId};

use crate::models::OtpHistoryModel;

use super::error::map_db_error;

/// PostgreSQL implementation of OtpHistoryRepository
#[derive(Clone)]
pub struct PgOtpHistoryRepository {
    pool: PgPool,
}

impl PgOtpHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpHistoryRepository for PgOtpHistoryRepository {
    #[instrument(skip(self, code))]
    async fn record_sent(&self, user_id: UserId, phone: &str, code: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO otp_history (user_id, phone, code, status, failed_attempts, created_at)
            VALUES ($1, $2, $3, 'SENT', 0, NOW())
            ",
        )
        .bind(user_id.into_inner())
        .bind(phone)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn mark_verified(&self, user_id: UserId, phone: &str, code: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE otp_history
            SET status = 'VERIFIED', verified_at = NOW()
            WHERE id = (
                SELECT id FROM otp_history
                WHERE user_id = $1 AND phone = $2 AND code = $3
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            ",
        )
        .bind(user_id.into_inner())
        .bind(phone)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_failed(&self, user_id: UserId, phone: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE otp_history
            SET status = 'FAILED', failed_attempts = failed_attempts + 1
            WHERE id = (
                SELECT id FROM otp_history
                WHERE user_id = $1 AND phone = $2 AND status IN ('SENT', 'FAILED')
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            ",
        )
        .bind(user_id.into_inner())
        .bind(phone)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_expired(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE otp_history SET status = 'EXPIRED' WHERE status = 'SENT' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM otp_history WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list_for(&self, user_id: UserId, phone: &str) -> RepoResult<Vec<OtpRecord>> {
        sqlx::query_as::<_, OtpHistoryModel>(
            r"
            SELECT id, user_id, phone, code, status, failed_attempts, created_at, verified_at
            FROM otp_history
            WHERE user_id = $1 AND phone = $2
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.into_inner())
        .bind(phone)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .map(OtpRecord::try_from)
        .collect()
    }
}
