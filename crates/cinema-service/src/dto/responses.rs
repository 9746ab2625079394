//! Response DTOs
//!
//! All response DTOs implement `Serialize` for JSON output.
//! User ids are serialized as strings.

use chrono::{DateTime, Utc};
use cinema_common::TokenPair;
use cinema_core::{Role, RoleExtension, User};
use serde::Serialize;

// ============================================================================
// Auth Responses
// ============================================================================

/// Tokens plus the onboarding state the client needs to route the user
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
    pub is_new_user: bool,
    pub is_verified: bool,
    pub needs_phone_verification: bool,
}

impl AuthSession {
    pub fn new(tokens: TokenPair, user: &User, is_new_user: bool) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            role: user.role,
            is_new_user,
            is_verified: user.is_verified,
            needs_phone_verification: user.needs_phone_verification(),
        }
    }
}

// ============================================================================
// Phone Verification Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OtpRequestOutcome {
    /// A new code was issued; it expires after `expires_in` seconds
    Sent { expires_in: u64 },
    /// The phone is already verified for this user; nothing was sent
    AlreadyVerified,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OtpVerification {
    Verified(AuthSession),
    AlreadyVerified { role: Role },
}

// ============================================================================
// User Responses
// ============================================================================

/// User profile with its role extension; never carries the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub extension: RoleExtension,
    pub created_at: DateTime<Utc>,
}
