//! Redis connection pool using deadpool-redis.
//!
//! Every command checks a connection out of the pool and returns it when the
//! command completes; no connection is held across calls.

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&cinema_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &cinema_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Error type for Redis pool operations
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid TTL: {0:?}")]
    InvalidTtl(Duration),
}

/// Result type for Redis pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

/// Whole seconds, at least one; Redis rejects a zero expiry
fn ttl_secs(ttl: Duration) -> RedisResult<u64> {
    match ttl.as_secs() {
        0 => Err(RedisPoolError::InvalidTtl(ttl)),
        secs => Ok(secs),
    }
}

impl RedisPool {
    /// Create a new Redis pool with the given configuration
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    /// Create a new Redis pool from cinema-common config
    pub fn from_config(config: &cinema_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RedisPoolError::GetConnection)
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// `SET key value EX ttl`
    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> RedisResult<()> {
        let secs = ttl_secs(ttl)?;
        let mut conn = self.get().await?;
        conn.set_ex::<_, _, ()>(key, value, secs).await?;
        Ok(())
    }

    pub async fn get_string(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.get().await?;
        Ok(conn.get(key).await?)
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        let deleted: i32 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    /// Remaining TTL. Redis answers -2 for a missing key and -1 for a key
    /// without expiry; both map to `None`.
    pub async fn ttl(&self, key: &str) -> RedisResult<Option<Duration>> {
        let mut conn = self.get().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(ttl).ok().map(Duration::from_secs))
    }

    /// `INCR key`, setting the expiry when the counter is created
    pub async fn incr_with_window(&self, key: &str, window: Duration) -> RedisResult<i64> {
        let secs = ttl_secs(window)?;
        let mut conn = self.get().await?;
        let count: i64 = conn.incr(key, 1).await?;
        if count == 1 {
            let secs = i64::try_from(secs).map_err(|_| RedisPoolError::InvalidTtl(window))?;
            conn.expire::<_, ()>(key, secs).await?;
        }
        Ok(count)
    }
}
