//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every method is a single round-trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{OtpRecord, Role, RoleDetails, RoleExtension, User};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

/// Lookups return `Ok(None)` for "absent". Unique-key violations on
/// `insert`/`update` surface as `DomainError::IdentityConflict`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by exact phone number
    async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find user by external provider subject
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>>;

    /// Insert a new user, returning the store-assigned id
    async fn insert(&self, user: &User) -> RepoResult<UserId>;

    /// Overwrite every mutable column of an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// All users, newest first
    async fn list_all(&self) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Role Extension Repository
// ============================================================================

/// Upserts insert on first write and update on conflict by `user_id`.
/// A `None` attribute stores the role default on insert and keeps the
/// stored value on update.
#[async_trait]
pub trait RoleExtensionRepository: Send + Sync {
    async fn upsert_admin(&self, user_id: UserId, level: Option<&str>) -> RepoResult<RoleExtension>;

    async fn upsert_staff(&self, user_id: UserId, dept: Option<&str>) -> RepoResult<RoleExtension>;

    async fn upsert_customer(
        &self,
        user_id: UserId,
        loyalty_points: Option<u32>,
    ) -> RepoResult<RoleExtension>;

    async fn get_admin_level(&self, user_id: UserId) -> RepoResult<Option<String>>;

    async fn get_staff_dept(&self, user_id: UserId) -> RepoResult<Option<String>>;

    async fn get_customer_points(&self, user_id: UserId) -> RepoResult<Option<u32>>;

    /// Upsert the extension matching `details`
    async fn upsert(&self, user_id: UserId, details: &RoleDetails) -> RepoResult<RoleExtension> {
        match details {
            RoleDetails::Admin { level } => self.upsert_admin(user_id, level.as_deref()).await,
            RoleDetails::Staff { dept } => self.upsert_staff(user_id, dept.as_deref()).await,
            RoleDetails::Customer { loyalty_points } => {
                self.upsert_customer(user_id, *loyalty_points).await
            }
        }
    }

    /// Read the extension row for `role`, if one exists
    async fn get(&self, user_id: UserId, role: Role) -> RepoResult<Option<RoleExtension>> {
        Ok(match role {
            Role::Admin => self
                .get_admin_level(user_id)
                .await?
                .map(|level| RoleExtension::Admin { level }),
            Role::Staff => self
                .get_staff_dept(user_id)
                .await?
                .map(|dept| RoleExtension::Staff { dept }),
            Role::Customer => self
                .get_customer_points(user_id)
                .await?
                .map(|loyalty_points| RoleExtension::Customer { loyalty_points }),
        })
    }
}

// ============================================================================
// OTP History Repository
// ============================================================================

/// Append-mostly OTP audit trail. The `mark_*` updates touch at most one
/// row, the most recent match by `created_at`, and report whether they did.
#[async_trait]
pub trait OtpHistoryRepository: Send + Sync {
    async fn record_sent(&self, user_id: UserId, phone: &str, code: &str) -> RepoResult<()>;

    /// Latest row for (user, phone, code) becomes VERIFIED
    async fn mark_verified(&self, user_id: UserId, phone: &str, code: &str) -> RepoResult<bool>;

    /// Latest still-open (SENT or FAILED) row for (user, phone) becomes FAILED
    /// with one more failed attempt. The submitted code is not part of the
    /// match since a wrong code never equals the issued one.
    async fn mark_failed(&self, user_id: UserId, phone: &str) -> RepoResult<bool>;

    /// Flip SENT rows created before `cutoff` to EXPIRED
    async fn mark_expired(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;

    /// Delete every row created before `cutoff`
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;

    /// History for one (user, phone) pair, newest first
    async fn list_for(&self, user_id: UserId, phone: &str) -> RepoResult<Vec<OtpRecord>>;
}
