//! Data transfer objects for requests and responses
//!
//! - Request DTOs with validation for inputs
//! - Response DTOs for serializing outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateUserRequest, EmailSignInRequest, GoogleSignInRequest, PromoteToAdminRequest,
    RefreshTokenRequest, RequestOtpRequest, VerifyOtpRequest,
};

pub use responses::{AuthSession, OtpRequestOutcome, OtpVerification, UserResponse};
