//! # cinema-auth
//!
//! Process wiring for the identity service: builds the [`ServiceContext`]
//! from configuration and supervises background jobs until shutdown.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cinema_cache::RedisPool;
use cinema_common::{AppConfig, JwtService};
use cinema_db::{create_pool, run_migrations};
use cinema_service::{GoogleIdTokenVerifier, OtpSweeper, ServiceContext, ServiceContextBuilder};
use tokio::sync::watch;
use tracing::{info, warn};

/// Connect both stores, apply migrations, and build the service context
pub async fn create_service_context(config: &AppConfig) -> anyhow::Result<ServiceContext> {
    info!("Connecting to PostgreSQL...");
    let db_config = cinema_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!("PostgreSQL connection established");

    run_migrations(&pool, Path::new(&config.database.migrations_dir))
        .await
        .context("failed to run migrations")?;

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis).context("failed to create Redis pool")?;
    redis_pool
        .health_check()
        .await
        .context("Redis health check failed")?;
    info!("Redis connection established");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));

    let mut builder = ServiceContextBuilder::new()
        .postgres(pool)
        .redis(redis_pool)
        .jwt_service(jwt_service)
        .otp_config(config.otp);

    match GoogleIdTokenVerifier::from_config(&config.google)
        .context("failed to set up Google sign-in")?
    {
        Some(verifier) => builder = builder.identity_verifier(Arc::new(verifier)),
        None => warn!("GOOGLE_CLIENT_ID not set; Google sign-in is disabled"),
    }

    builder.build().context("failed to build service context")
}

/// Run until Ctrl-C, then stop background jobs and wait for them
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let ctx = create_service_context(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = OtpSweeper::new(ctx).spawn(shutdown_rx);

    info!("Service ready");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    // Receivers may already be gone if the sweeper exited
    let _ = shutdown_tx.send(true);
    sweeper.await.context("OTP sweeper task panicked")?;

    info!("Shutdown complete");
    Ok(())
}
