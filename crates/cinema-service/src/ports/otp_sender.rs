//! OTP delivery channel

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use crate::services::ServiceResult;

pub const OTP_CODE_LENGTH: usize = 6;

/// Generates a code, delivers it to a phone, and hands the code back so it
/// can be cached for verification.
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send(&self, phone: &str) -> ServiceResult<String>;
}

/// A uniformly random, zero-padded six digit code
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Sender that only records the delivery in the log. The code itself is
/// never written out.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, phone: &str) -> ServiceResult<String> {
        let code = generate_code();
        info!(phone = %phone, "OTP dispatched");
        Ok(code)
    }
}
