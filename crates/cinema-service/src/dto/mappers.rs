//! Entity to DTO mappers

use cinema_core::{RoleExtension, User};

use super::responses::UserResponse;

impl UserResponse {
    /// Pair a user with the role summary read alongside it
    pub fn with_extension(user: &User, extension: RoleExtension) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            is_verified: user.is_verified,
            extension,
            created_at: user.created_at,
        }
    }
}
