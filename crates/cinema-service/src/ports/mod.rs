//! Narrow collaborator interfaces the services call out through

pub mod external_identity;
pub mod google;
pub mod otp_sender;

pub use external_identity::{DisabledIdentityVerifier, ExternalIdentity, ExternalIdentityVerifier};
pub use google::{GoogleIdTokenVerifier, GOOGLE_CERTS_URL};
pub use otp_sender::{generate_code, LogOtpSender, OtpSender, OTP_CODE_LENGTH};
