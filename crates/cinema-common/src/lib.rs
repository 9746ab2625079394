//! # cinema-common
//!
//! Shared utilities including configuration, error handling, token issuing,
//! password hashing, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService, PasswordService, TokenPair, TokenType};
pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, GoogleConfig, JwtConfig,
    OtpConfig, RedisConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
