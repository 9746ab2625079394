//! User entity <-> model mapper

use cinema_core::{DomainError, Role, User, UserId};

use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(model.id),
            name: model.name,
            phone_number: model.phone_number,
            email: model.email,
            password_hash: model.password_hash,
            external_id: model.external_id,
            role: Role::from_id(model.role_id)?,
            is_verified: model.is_verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Column values written by both insert and update
pub struct UserWrite<'a> {
    pub name: &'a str,
    pub phone_number: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub external_id: Option<&'a str>,
    pub role_id: i16,
    pub is_verified: bool,
}

impl<'a> UserWrite<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            name: &user.name,
            phone_number: user.phone_number.as_deref(),
            email: user.email.as_deref(),
            password_hash: user.password_hash.as_deref(),
            external_id: user.external_id.as_deref(),
            role_id: user.role.id(),
            is_verified: user.is_verified,
        }
    }
}
