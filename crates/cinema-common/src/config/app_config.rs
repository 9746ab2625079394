//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub google: GoogleConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Parse an `APP_ENV` value; unknown names yield `None`
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Phone OTP configuration
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OtpConfig {
    /// Lifetime of a cached code
    pub code_ttl_seconds: u64,
    /// Minimum gap between two code requests for one phone
    pub cooldown_seconds: u64,
    /// Window of the failed-attempt counter
    pub failed_window_seconds: u64,
    /// SENT history rows older than this are swept to EXPIRED
    pub expire_minutes: i64,
    /// History rows older than this are deleted
    pub retention_days: i64,
    pub sweep_interval_seconds: u64,
}

impl OtpConfig {
    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    #[must_use]
    pub fn failed_window(&self) -> Duration {
        Duration::from_secs(self.failed_window_seconds)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: 300,
            cooldown_seconds: 60,
            failed_window_seconds: 300,
            expire_minutes: 5,
            retention_days: 5,
            sweep_interval_seconds: 60,
        }
    }
}

/// Google sign-in configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleConfig {
    /// Expected audience of Google ID tokens
    pub client_id: Option<String>,
}

// Default value functions
fn default_app_name() -> String {
    "cinema-auth".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_migrations_dir() -> String {
    "./migrations".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604800 // 7 days
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or empty
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };
        let defaults = OtpConfig::default();

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::from_name)
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections()),
                min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections()),
                migrations_dir: lookup("MIGRATIONS_DIR").unwrap_or_else(default_migrations_dir),
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: parse_or(&lookup, "REDIS_MAX_CONNECTIONS", default_redis_max_connections()),
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                access_token_expiry: parse_or(&lookup, "JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry()),
                refresh_token_expiry: parse_or(&lookup, "JWT_REFRESH_TOKEN_EXPIRY", default_refresh_token_expiry()),
            },
            otp: OtpConfig {
                code_ttl_seconds: parse_or(&lookup, "OTP_TTL_SECONDS", defaults.code_ttl_seconds),
                cooldown_seconds: parse_or(&lookup, "OTP_COOLDOWN_SECONDS", defaults.cooldown_seconds),
                failed_window_seconds: parse_or(&lookup, "OTP_FAILED_WINDOW_SECONDS", defaults.failed_window_seconds),
                expire_minutes: parse_or(&lookup, "OTP_EXPIRE_MINUTES", defaults.expire_minutes),
                retention_days: parse_or(&lookup, "OTP_RETENTION_DAYS", defaults.retention_days),
                sweep_interval_seconds: parse_or(&lookup, "OTP_SWEEP_INTERVAL_SECONDS", defaults.sweep_interval_seconds),
            },
            google: GoogleConfig {
                client_id: lookup("GOOGLE_CLIENT_ID").filter(|v| !v.trim().is_empty()),
            },
        })
    }
}

/// Unparsable values fall back to the default
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
