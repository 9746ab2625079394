//! Business logic services
//!
//! Identity resolution, phone verification, sign-in, operator
//! administration, and the OTP history sweeper.

pub mod admin;
pub mod auth;
pub mod context;
pub mod error;
pub mod identity;
pub mod sweeper;
pub mod verification;

// Re-export all services for convenience
pub use admin::AdminService;
pub use auth::{AuthService, Principal, DEFAULT_EXTERNAL_NAME};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use identity::{IdentityStore, ResolvedUser};
pub use sweeper::{OtpSweeper, SweepReport};
pub use verification::VerificationService;
