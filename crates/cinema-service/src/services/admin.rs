//! Admin service
//!
//! Operator onboarding of staff and admin accounts, promotion, and the user
//! listing. Callers pass the authenticated [`Principal`], which must be an
//! admin.

use cinema_core::entities::{IdentityCandidate, Role, RoleDetails};
use cinema_core::UserId;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateUserRequest, PromoteToAdminRequest, UserResponse};

use super::auth::Principal;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::identity::IdentityStore;

/// Admin service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    /// Create a new AdminService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a staff or admin account. Trusted roles start verified.
    ///
    /// # Errors
    /// `Forbidden` for non-admin callers, `Validation` for a customer role or
    /// bad fields, `Conflict` when the email or phone already belongs to a user.
    #[instrument(skip(self, request), fields(caller = %caller.user_id, role = %request.role))]
    pub async fn create_user(
        &self,
        caller: &Principal,
        request: CreateUserRequest,
    ) -> ServiceResult<UserResponse> {
        caller.require_role(&[Role::Admin])?;
        request.validate()?;

        let details = RoleDetails::from_parts(
            &request.role,
            request.level.as_deref(),
            request.dept.as_deref(),
            None,
        )?;
        if !details.role().is_trusted() {
            return Err(ServiceError::validation(
                "only staff or admin accounts can be created here",
            ));
        }

        let candidate = IdentityCandidate::new()
            .with_name(&request.name)
            .with_email(&request.email)
            .with_phone(&request.phone)
            .with_plaintext_password(&request.password);

        // Onboarding never merges into someone else's account
        let repo = self.ctx.user_repo();
        if let Some(email) = candidate.email() {
            if repo.find_by_email(email).await?.is_some() {
                return Err(ServiceError::conflict("user with this email already exists"));
            }
        }
        if let Some(phone) = candidate.phone_number() {
            if repo.find_by_phone(phone).await?.is_some() {
                return Err(ServiceError::conflict("user with this phone already exists"));
            }
        }

        let resolved = IdentityStore::new(self.ctx)
            .resolve_or_create(candidate, details)
            .await?;
        if !resolved.created {
            return Err(ServiceError::conflict("user already exists"));
        }

        info!(user_id = %resolved.user.id, "Operator account created");
        let extension = match resolved.extension {
            Some(extension) => extension,
            None => IdentityStore::new(self.ctx).role_summary(&resolved.user).await,
        };
        Ok(UserResponse::with_extension(&resolved.user, extension))
    }

    /// Promote a staff member to admin
    ///
    /// # Errors
    /// `Forbidden` for non-admin callers, `NotFound` for an unknown user,
    /// `Validation` when the target is not staff.
    #[instrument(skip(self, request), fields(caller = %caller.user_id))]
    pub async fn promote_to_admin(
        &self,
        caller: &Principal,
        user_id: UserId,
        request: PromoteToAdminRequest,
    ) -> ServiceResult<UserResponse> {
        caller.require_role(&[Role::Admin])?;
        request.validate()?;

        let identities = IdentityStore::new(self.ctx);
        let user = identities.get(user_id).await?;
        match user.role {
            Role::Staff => {}
            Role::Admin => return Err(ServiceError::validation("user is already an admin")),
            Role::Customer => {
                return Err(ServiceError::validation("only staff can be promoted to admin"))
            }
        }

        let resolved = identities
            .change_role(user.id, RoleDetails::admin(request.level.as_deref()))
            .await?;

        info!(user_id = %user_id, "Promoted to admin");
        let extension = match resolved.extension {
            Some(extension) => extension,
            None => identities.role_summary(&resolved.user).await,
        };
        Ok(UserResponse::with_extension(&resolved.user, extension))
    }

    /// All users, newest first, each with its role summary
    #[instrument(skip(self), fields(caller = %caller.user_id))]
    pub async fn list_users(&self, caller: &Principal) -> ServiceResult<Vec<UserResponse>> {
        caller.require_role(&[Role::Admin])?;

        let identities = IdentityStore::new(self.ctx);
        let users = identities.list_users().await?;

        let mut responses = Vec::with_capacity(users.len());
        for user in &users {
            let extension = identities.role_summary(user).await;
            responses.push(UserResponse::with_extension(user, extension));
        }
        Ok(responses)
    }
}
