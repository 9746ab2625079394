//! Cinema identity service entry point
//!
//! Run with:
//! ```bash
//! cargo run -p cinema-auth
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use cinema_common::{try_init_tracing, AppConfig, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // APP_ENV picks the log format before the full config is loaded
    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| Environment::from_name(&v))
        .unwrap_or_default();
    if let Err(e) = try_init_tracing(TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %format!("{e:#}"), "Service failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting cinema identity service...");

    let config = AppConfig::from_env().inspect_err(|e| {
        error!(error = %e, "Failed to load configuration");
    })?;

    info!(
        env = ?config.app.env,
        name = %config.app.name,
        "Configuration loaded"
    );

    cinema_auth::run(config).await
}
