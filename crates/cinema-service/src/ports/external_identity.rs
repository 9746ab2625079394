//! External identity provider (Google sign-in)

use async_trait::async_trait;
use cinema_common::AppError;

use crate::services::ServiceResult;

/// Claims the provider vouches for after checking an ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider subject, stored as the user's `external_id`
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[async_trait]
pub trait ExternalIdentityVerifier: Send + Sync {
    /// Verify `id_token` and return the identity it asserts.
    /// Invalid tokens fail with `AppError::InvalidToken`.
    async fn verify(&self, id_token: &str) -> ServiceResult<ExternalIdentity>;
}

/// Verifier used when no provider is configured; every sign-in is refused
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIdentityVerifier;

#[async_trait]
impl ExternalIdentityVerifier for DisabledIdentityVerifier {
    async fn verify(&self, _id_token: &str) -> ServiceResult<ExternalIdentity> {
        Err(AppError::ExternalService("external sign-in is not configured".to_string()).into())
    }
}
