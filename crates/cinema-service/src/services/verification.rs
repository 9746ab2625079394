//! Phone verification service
//!
//! Per (user, phone): UNVERIFIED -> OTP_PENDING -> VERIFIED. Requesting a
//! code is guarded by a per-phone cooldown that fails open when the cache
//! is down. Checking a code fails closed: a cache error counts as a wrong
//! code. The phone uniqueness check runs only after the code matched, so a
//! wrong code never reveals who holds a number.

use cinema_cache::OtpKeys;
use cinema_core::{normalize_text, User, UserId};
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::dto::{
    AuthSession, OtpRequestOutcome, OtpVerification, RequestOtpRequest, VerifyOtpRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::identity::IdentityStore;

/// Phone verification service
pub struct VerificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VerificationService<'a> {
    /// Create a new VerificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a one-time code for the requested phone on behalf of `user_id`
    ///
    /// # Errors
    /// A validation error for a malformed phone; `RateLimited` while the
    /// phone's cooldown marker is live; an infrastructure error if the code
    /// cannot be cached.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn request_otp(
        &self,
        user_id: UserId,
        request: RequestOtpRequest,
    ) -> ServiceResult<OtpRequestOutcome> {
        request.validate()?;

        let phone = required_phone(&request.phone)?;
        let user = IdentityStore::new(self.ctx).get(user_id).await?;

        if is_verified_for(&user, &phone) {
            debug!("Phone already verified, no code issued");
            return Ok(OtpRequestOutcome::AlreadyVerified);
        }

        self.check_cooldown(&phone).await?;

        let code = self.ctx.otp_sender().send(&phone).await?;
        let config = self.ctx.otp_config();

        self.ctx
            .cache()
            .set_with_ttl(&OtpKeys::code(user_id, &phone), &code, config.code_ttl())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to cache OTP"))?;

        if let Err(e) = self.ctx.otp_repo().record_sent(user_id, &phone, &code).await {
            warn!(error = %e, "Failed to record OTP history");
        }

        info!("OTP issued");
        Ok(OtpRequestOutcome::Sent {
            expires_in: config.code_ttl_seconds,
        })
    }

    /// Reject while a cooldown marker is live; otherwise set one.
    ///
    /// Cache failures on either step let the request through.
    async fn check_cooldown(&self, phone: &str) -> ServiceResult<()> {
        let key = OtpKeys::cooldown(phone);
        let cache = self.ctx.cache();

        match cache.ttl_remaining(&key).await {
            Ok(Some(remaining)) if !remaining.is_zero() => {
                warn!("OTP requested during cooldown");
                return Err(ServiceError::RateLimited {
                    retry_after_secs: remaining.as_secs().max(1),
                });
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Cooldown check failed, allowing request"),
        }

        if let Err(e) = cache.set_with_ttl(&key, "1", self.ctx.otp_config().cooldown()).await {
            warn!(error = %e, "Failed to set OTP cooldown marker");
        }
        Ok(())
    }

    /// Check a submitted code and, on a match, bind the phone and sign in
    ///
    /// # Errors
    /// A validation error for a malformed phone or code, checked before any
    /// store is read; `InvalidOtp` for a wrong, expired, or unreadable code;
    /// a conflict if another user already holds the phone.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn verify_otp(
        &self,
        user_id: UserId,
        request: VerifyOtpRequest,
    ) -> ServiceResult<OtpVerification> {
        request.validate()?;

        let phone = required_phone(&request.phone)?;
        let code = request.otp.trim();
        if code.is_empty() {
            return Err(ServiceError::validation("otp is required"));
        }

        let identities = IdentityStore::new(self.ctx);
        let user = identities.get(user_id).await?;

        if is_verified_for(&user, &phone) {
            return Ok(OtpVerification::AlreadyVerified { role: user.role });
        }

        let code_key = OtpKeys::code(user_id, &phone);
        let cached = match self.ctx.cache().get(&code_key).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "OTP lookup failed, treating as mismatch");
                None
            }
        };

        if cached.as_deref() != Some(code) {
            self.record_failure(user_id, &phone).await;
            return Err(ServiceError::InvalidOtp);
        }

        let user = identities.bind_verified_phone(user, &phone).await?;

        if let Err(e) = self.ctx.cache().delete(&code_key).await {
            warn!(error = %e, "Failed to delete verified OTP");
        }
        if let Err(e) = self.ctx.cache().delete(&OtpKeys::failed_attempts(user_id, &phone)).await {
            debug!(error = %e, "Failed to clear failed-attempt counter");
        }
        if let Err(e) = self.ctx.otp_repo().mark_verified(user_id, &phone, code).await {
            warn!(error = %e, "Failed to record OTP verification");
        }

        let tokens = self.ctx.jwt_service().generate_token_pair(user.id, user.role)?;
        info!("Phone verification complete");
        Ok(OtpVerification::Verified(AuthSession::new(tokens, &user, false)))
    }

    /// Bump the windowed counter and the history row; both best effort
    async fn record_failure(&self, user_id: UserId, phone: &str) {
        let key = OtpKeys::failed_attempts(user_id, phone);
        match self
            .ctx
            .cache()
            .increment(&key, self.ctx.otp_config().failed_window())
            .await
        {
            Ok(attempts) => warn!(attempts, "OTP mismatch"),
            Err(e) => warn!(error = %e, "OTP mismatch; failed-attempt counter unavailable"),
        }

        if let Err(e) = self.ctx.otp_repo().mark_failed(user_id, phone).await {
            warn!(error = %e, "Failed to record OTP failure");
        }
    }

    /// Current failed-attempt count within the window, zero if unknown
    pub async fn failed_attempts(&self, user_id: UserId, phone: &str) -> i64 {
        let key = OtpKeys::failed_attempts(user_id, phone.trim());
        match self.ctx.cache().get(&key).await {
            Ok(Some(value)) => value.parse().unwrap_or(0),
            _ => 0,
        }
    }
}

fn required_phone(phone: &str) -> ServiceResult<String> {
    normalize_text(Some(phone)).ok_or_else(|| ServiceError::validation("phone is required"))
}

fn is_verified_for(user: &User, phone: &str) -> bool {
    user.is_verified && user.phone_number.as_deref() == Some(phone)
}
