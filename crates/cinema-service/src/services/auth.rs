//! Authentication service
//!
//! Handles email sign-in, Google sign-in, token refresh, and resolving an
//! access token back to the calling user.

use cinema_common::AppError;
use cinema_core::entities::{IdentityCandidate, Role, RoleDetails};
use cinema_core::{normalize_email, User, UserId};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{AuthSession, EmailSignInRequest, GoogleSignInRequest, RefreshTokenRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::identity::IdentityStore;

/// Display name used when the provider does not supply one
pub const DEFAULT_EXTERNAL_NAME: &str = "Google User";

/// The authenticated caller behind an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub is_verified: bool,
}

impl Principal {
    /// # Errors
    /// `Forbidden` unless the principal holds one of `allowed`
    pub fn require_role(&self, allowed: &[Role]) -> ServiceResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(format!(
                "role {} may not perform this action",
                self.role
            )))
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            is_verified: user.is_verified,
        }
    }
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sign in with email and password; an unknown email registers a customer
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn email_sign_in(&self, request: EmailSignInRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        let email = normalize_email(Some(&request.email))
            .ok_or_else(|| ServiceError::validation("email is required"))?;

        // An existing account must prove the password before anything merges
        if let Some(user) = self.ctx.user_repo().find_by_email(&email).await? {
            let Some(hash) = user.password_hash.as_deref() else {
                warn!(user_id = %user.id, "Sign-in failed: account has no password");
                return Err(AppError::InvalidCredentials.into());
            };
            if !self.ctx.password_service().verify(&request.password, hash)? {
                warn!(user_id = %user.id, "Sign-in failed: invalid password");
                return Err(AppError::InvalidCredentials.into());
            }
        }

        let mut candidate = IdentityCandidate::new()
            .with_email(&email)
            .with_plaintext_password(&request.password);
        if let Some(name) = request.name.as_deref() {
            candidate = candidate.with_name(name);
        }

        let resolved = IdentityStore::new(self.ctx)
            .resolve_or_create(candidate, RoleDetails::unspecified(Role::Customer))
            .await?;

        info!(user_id = %resolved.user.id, created = resolved.created, "Email sign-in");
        self.issue_session(&resolved.user, resolved.created)
    }

    /// Sign in with a Google ID token; the subject becomes the external id
    #[instrument(skip(self, request))]
    pub async fn google_sign_in(&self, request: GoogleSignInRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        let identity = self.ctx.identity_verifier().verify(&request.id_token).await?;
        let email = identity
            .email
            .as_deref()
            .and_then(|e| normalize_email(Some(e)))
            .ok_or_else(|| ServiceError::validation("Google account has no email"))?;
        let name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_EXTERNAL_NAME);

        let candidate = IdentityCandidate::new()
            .with_email(&email)
            .with_external_id(&identity.subject)
            .with_name(name);

        let resolved = IdentityStore::new(self.ctx)
            .resolve_or_create(candidate, RoleDetails::unspecified(Role::Customer))
            .await?;

        info!(user_id = %resolved.user.id, created = resolved.created, "Google sign-in");
        self.issue_session(&resolved.user, resolved.created)
    }

    /// Exchange a refresh token for a new pair carrying the current role
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        self.issue_session(&user, false)
    }

    /// Resolve an access token to the caller, re-reading the user so role
    /// and verification state are current
    #[instrument(skip(self, access_token))]
    pub async fn authenticate(&self, access_token: &str) -> ServiceResult<Principal> {
        let claims = self.ctx.jwt_service().validate_access_token(access_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(Principal::from(&user))
    }

    fn issue_session(&self, user: &User, is_new_user: bool) -> ServiceResult<AuthSession> {
        let tokens = self.ctx.jwt_service().generate_token_pair(user.id, user.role)?;
        Ok(AuthSession::new(tokens, user, is_new_user))
    }
}
