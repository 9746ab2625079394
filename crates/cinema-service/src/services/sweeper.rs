//! OTP history sweeper
//!
//! Background job that flips stale SENT rows to EXPIRED and deletes rows
//! past the retention window. Runs on its own task, independent of request
//! handling.

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Row counts touched by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: u64,
    pub deleted: u64,
}

/// Periodic OTP history maintenance
#[derive(Debug, Clone)]
pub struct OtpSweeper {
    ctx: ServiceContext,
}

impl OtpSweeper {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run one expiry pass and one retention pass
    ///
    /// # Errors
    /// Returns the first repository error; a failed expiry pass skips the
    /// retention pass for this tick.
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> ServiceResult<SweepReport> {
        let config = self.ctx.otp_config();
        let now = Utc::now();
        let repo = self.ctx.otp_repo();

        let expired = repo
            .mark_expired(now - Duration::minutes(config.expire_minutes))
            .await?;
        let deleted = repo
            .delete_older_than(now - Duration::days(config.retention_days))
            .await?;

        if expired > 0 || deleted > 0 {
            info!(expired, deleted, "OTP history swept");
        } else {
            debug!("OTP history sweep found nothing");
        }
        Ok(SweepReport { expired, deleted })
    }

    /// Sweep on every tick until `shutdown` flips to `true` or its sender
    /// is dropped. Sweep errors are logged and the loop carries on.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self
            .ctx
            .otp_config()
            .sweep_interval()
            .max(std::time::Duration::from_secs(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "OTP sweeper started");

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "OTP sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("OTP sweeper stopped");
    }

    /// Spawn [`run`](Self::run) onto the runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
