//! Identity store
//!
//! Resolves partial identities against existing users by phone, then email,
//! then external id; merges them non-destructively; and keeps the role
//! extension row in step with the user's role.

use cinema_core::entities::{IdentityCandidate, Role, RoleDetails, RoleExtension, User};
use cinema_core::UserId;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Neutral value reported when an extension row cannot be read
const UNKNOWN_ATTRIBUTE: &str = "unknown";

/// Outcome of [`IdentityStore::resolve_or_create`]
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub user: User,
    /// `true` when no existing user matched and a row was inserted
    pub created: bool,
    /// Extension row after sync; `None` if the sync write failed
    pub extension: Option<RoleExtension>,
}

/// Identity store service
pub struct IdentityStore<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityStore<'a> {
    /// Create a new IdentityStore
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Find the user a candidate refers to, or create one.
    ///
    /// `details.role()` is the role for a newly created user. An existing
    /// user keeps its role; the candidate's details only reach the
    /// extension row when they are for that role.
    ///
    /// The extension is synced after every call. A failed extension write
    /// is logged and the user is still returned.
    #[instrument(skip(self, candidate, details), fields(role = %details.role()))]
    pub async fn resolve_or_create(
        &self,
        candidate: IdentityCandidate,
        details: RoleDetails,
    ) -> ServiceResult<ResolvedUser> {
        candidate.validate()?;

        let existing = self.find_existing(&candidate).await?;
        let hashed_plaintext = match candidate.plaintext_to_hash(existing.as_ref()) {
            Some(plaintext) => Some(self.ctx.password_service().hash(plaintext)?),
            None => None,
        };

        let (user, created) = match existing {
            Some(mut user) => {
                if user.merge_from(&candidate, hashed_plaintext) {
                    self.ctx.user_repo().update(&user).await?;
                    debug!(user_id = %user.id, "Merged identity into existing user");
                }
                (user, false)
            }
            None => {
                let mut user = User::from_candidate(&candidate, details.role(), hashed_plaintext);
                user.id = self.ctx.user_repo().insert(&user).await?;
                info!(user_id = %user.id, role = %user.role, "User created");
                (user, true)
            }
        };

        let details = if details.role() == user.role {
            details
        } else {
            RoleDetails::unspecified(user.role)
        };
        let extension = self.sync_extension(user.id, &details).await;

        Ok(ResolvedUser {
            user,
            created,
            extension,
        })
    }

    /// First match by phone, then email, then external id
    async fn find_existing(&self, candidate: &IdentityCandidate) -> ServiceResult<Option<User>> {
        let repo = self.ctx.user_repo();

        if let Some(phone) = candidate.phone_number() {
            if let Some(user) = repo.find_by_phone(phone).await? {
                return Ok(Some(user));
            }
        }
        if let Some(email) = candidate.email() {
            if let Some(user) = repo.find_by_email(email).await? {
                return Ok(Some(user));
            }
        }
        if let Some(external_id) = candidate.external_id() {
            if let Some(user) = repo.find_by_external_id(external_id).await? {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// Upsert the extension row, logging instead of failing
    async fn sync_extension(&self, user_id: UserId, details: &RoleDetails) -> Option<RoleExtension> {
        let details = details.clone().normalized();
        match self.ctx.role_repo().upsert(user_id, &details).await {
            Ok(extension) => Some(extension),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    role = %details.role(),
                    error = %e,
                    "Role extension sync failed; user row kept"
                );
                None
            }
        }
    }

    /// Get a user by id
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn find_by_phone(&self, phone: &str) -> ServiceResult<Option<User>> {
        Ok(self.ctx.user_repo().find_by_phone(phone).await?)
    }

    /// All users, newest first
    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.user_repo().list_all().await?)
    }

    /// Move a user to the role `details` names and sync that extension.
    ///
    /// The previous role's extension row is left in place.
    #[instrument(skip(self, details), fields(role = %details.role()))]
    pub async fn change_role(
        &self,
        user_id: UserId,
        details: RoleDetails,
    ) -> ServiceResult<ResolvedUser> {
        let mut user = self.get(user_id).await?;
        let role = details.role();

        if user.role != role {
            let previous = user.role;
            user.set_role(role);
            self.ctx.user_repo().update(&user).await?;
            info!(user_id = %user.id, from = %previous, to = %role, "Role changed");
        }

        let extension = self.sync_extension(user.id, &details).await;
        Ok(ResolvedUser {
            user,
            created: false,
            extension,
        })
    }

    /// Bind a phone that passed OTP verification and mark the user verified.
    ///
    /// Fails with a conflict, before any write, when another user already
    /// holds the phone.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn bind_verified_phone(&self, mut user: User, phone: &str) -> ServiceResult<User> {
        if let Some(holder) = self.ctx.user_repo().find_by_phone(phone).await? {
            if holder.id != user.id {
                warn!(holder_id = %holder.id, "Phone already bound to another user");
                return Err(cinema_core::DomainError::PhoneAlreadyBound.into());
            }
        }

        user.bind_verified_phone(phone);
        self.ctx.user_repo().update(&user).await?;
        info!("Phone verified and bound");
        Ok(user)
    }

    /// Extension attributes for the user's current role.
    ///
    /// Missing rows and read failures report neutral values (`"unknown"`,
    /// zero points) instead of an error.
    pub async fn role_summary(&self, user: &User) -> RoleExtension {
        let found = match self.ctx.role_repo().get(user.id, user.role).await {
            Ok(found) => found,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Role extension read failed");
                None
            }
        };
        found.unwrap_or_else(|| neutral_extension(user.role))
    }
}

fn neutral_extension(role: Role) -> RoleExtension {
    match role {
        Role::Admin => RoleExtension::Admin {
            level: UNKNOWN_ATTRIBUTE.to_string(),
        },
        Role::Staff => RoleExtension::Staff {
            dept: UNKNOWN_ATTRIBUTE.to_string(),
        },
        Role::Customer => RoleExtension::Customer { loyalty_points: 0 },
    }
}
