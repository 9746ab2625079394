//! Service context - dependency container for services
//!
//! Holds the repositories, the cache port, token and password services, and
//! the OTP/identity-provider collaborators. Every handle is an `Arc`, so the
//! context is cheap to clone into background tasks.

use std::sync::Arc;

use cinema_cache::{RedisKeyValueCache, RedisPool};
use cinema_common::{JwtService, OtpConfig, PasswordService};
use cinema_core::traits::{
    KeyValueCache, OtpHistoryRepository, RoleExtensionRepository, UserRepository,
};
use cinema_db::{PgOtpHistoryRepository, PgPool, PgRoleExtensionRepository, PgUserRepository};

use crate::ports::{DisabledIdentityVerifier, ExternalIdentityVerifier, LogOtpSender, OtpSender};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleExtensionRepository>,
    otp_repo: Arc<dyn OtpHistoryRepository>,

    // Cache
    cache: Arc<dyn KeyValueCache>,

    // Services
    jwt_service: Arc<JwtService>,
    password_service: Arc<PasswordService>,
    otp_config: OtpConfig,

    // Collaborators
    otp_sender: Arc<dyn OtpSender>,
    identity_verifier: Arc<dyn ExternalIdentityVerifier>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the role extension repository
    pub fn role_repo(&self) -> &dyn RoleExtensionRepository {
        self.role_repo.as_ref()
    }

    /// Get the OTP history repository
    pub fn otp_repo(&self) -> &dyn OtpHistoryRepository {
        self.otp_repo.as_ref()
    }

    // === Cache ===

    pub fn cache(&self) -> &dyn KeyValueCache {
        self.cache.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> &PasswordService {
        self.password_service.as_ref()
    }

    pub fn otp_config(&self) -> &OtpConfig {
        &self.otp_config
    }

    // === Collaborators ===

    pub fn otp_sender(&self) -> &dyn OtpSender {
        self.otp_sender.as_ref()
    }

    pub fn identity_verifier(&self) -> &dyn ExternalIdentityVerifier {
        self.identity_verifier.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cache", &"...")
            .field("otp_config", &self.otp_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// The OTP sender defaults to [`LogOtpSender`], the identity verifier to
/// [`DisabledIdentityVerifier`], the password service to Argon2id defaults,
/// and the OTP settings to [`OtpConfig::default`].
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    role_repo: Option<Arc<dyn RoleExtensionRepository>>,
    otp_repo: Option<Arc<dyn OtpHistoryRepository>>,
    cache: Option<Arc<dyn KeyValueCache>>,
    jwt_service: Option<Arc<JwtService>>,
    password_service: Option<Arc<PasswordService>>,
    otp_config: OtpConfig,
    otp_sender: Option<Arc<dyn OtpSender>>,
    identity_verifier: Option<Arc<dyn ExternalIdentityVerifier>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            role_repo: None,
            otp_repo: None,
            cache: None,
            jwt_service: None,
            password_service: None,
            otp_config: OtpConfig::default(),
            otp_sender: None,
            identity_verifier: None,
        }
    }

    /// Wire all three repositories to one PostgreSQL pool
    pub fn postgres(self, pool: PgPool) -> Self {
        self.user_repo(Arc::new(PgUserRepository::new(pool.clone())))
            .role_repo(Arc::new(PgRoleExtensionRepository::new(pool.clone())))
            .otp_repo(Arc::new(PgOtpHistoryRepository::new(pool)))
    }

    /// Use Redis as the key-value cache
    pub fn redis(self, pool: RedisPool) -> Self {
        self.cache(Arc::new(RedisKeyValueCache::new(pool)))
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn role_repo(mut self, repo: Arc<dyn RoleExtensionRepository>) -> Self {
        self.role_repo = Some(repo);
        self
    }

    pub fn otp_repo(mut self, repo: Arc<dyn OtpHistoryRepository>) -> Self {
        self.otp_repo = Some(repo);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn KeyValueCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn password_service(mut self, service: Arc<PasswordService>) -> Self {
        self.password_service = Some(service);
        self
    }

    pub fn otp_config(mut self, config: OtpConfig) -> Self {
        self.otp_config = config;
        self
    }

    pub fn otp_sender(mut self, sender: Arc<dyn OtpSender>) -> Self {
        self.otp_sender = Some(sender);
        self
    }

    pub fn identity_verifier(mut self, verifier: Arc<dyn ExternalIdentityVerifier>) -> Self {
        self.identity_verifier = Some(verifier);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            role_repo: self
                .role_repo
                .ok_or_else(|| ServiceError::validation("role_repo is required"))?,
            otp_repo: self
                .otp_repo
                .ok_or_else(|| ServiceError::validation("otp_repo is required"))?,
            cache: self
                .cache
                .ok_or_else(|| ServiceError::validation("cache is required"))?,
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            password_service: self
                .password_service
                .unwrap_or_else(|| Arc::new(PasswordService::new())),
            otp_config: self.otp_config,
            otp_sender: self.otp_sender.unwrap_or_else(|| Arc::new(LogOtpSender)),
            identity_verifier: self
                .identity_verifier
                .unwrap_or_else(|| Arc::new(DisabledIdentityVerifier)),
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
