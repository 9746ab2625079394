//! # cinema-service
//!
//! Application layer: identity resolution and merge, role extension sync,
//! phone OTP verification, sign-in flows, operator administration, and the
//! OTP history sweeper.

pub mod dto;
pub mod ports;
pub mod services;

pub use ports::{ExternalIdentity, ExternalIdentityVerifier, GoogleIdTokenVerifier, OtpSender};
pub use services::{
    AdminService, AuthService, DEFAULT_EXTERNAL_NAME, IdentityStore, OtpSweeper, Principal, ResolvedUser,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, SweepReport,
    VerificationService,
};
