//! # cinema-db
//!
//! Database layer implementing the cinema-core repository traits with
//! PostgreSQL via SQLx.
//!
//! - Connection pool management and runtime migrations
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cinema_db::{create_pool, run_migrations, DatabaseConfig, PgUserRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool, std::path::Path::new("./migrations")).await?;
//!     let users = PgUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgOtpHistoryRepository, PgRoleExtensionRepository, PgUserRepository};
