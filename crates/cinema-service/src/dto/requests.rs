//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Sign-in Requests
// ============================================================================

/// Email + password sign-in; unknown emails become new customers
#[derive(Clone, Deserialize, Validate)]
pub struct EmailSignInRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for EmailSignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSignInRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GoogleSignInRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

// ============================================================================
// Phone Verification Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestOtpRequest {
    #[validate(length(min = 4, max = 20, message = "Phone must be 4-20 characters"))]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 4, max = 20, message = "Phone must be 4-20 characters"))]
    pub phone: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

// ============================================================================
// Admin Requests
// ============================================================================

/// Operator onboarding of a staff or admin account
#[derive(Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 4, max = 20, message = "Phone must be 4-20 characters"))]
    pub phone: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// `"staff"` or `"admin"`
    pub role: String,

    /// Admin level, admins only
    pub level: Option<String>,

    /// Department, staff only
    pub dept: Option<String>,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("level", &self.level)
            .field("dept", &self.dept)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PromoteToAdminRequest {
    #[validate(length(max = 50, message = "Level must be at most 50 characters"))]
    pub level: Option<String>,
}
