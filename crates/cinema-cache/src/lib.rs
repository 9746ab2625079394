//! # cinema-cache
//!
//! Redis layer for short-lived identity state: issued OTP codes, request
//! cooldown markers, and failed-attempt counters. Nothing here is
//! authoritative; callers decide whether a cache failure fails open or closed.
//!
//! ## Example
//!
//! ```ignore
//! use cinema_cache::{OtpKeys, RedisKeyValueCache, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let cache = RedisKeyValueCache::new(pool);
//! cache.set_with_ttl(&OtpKeys::code(user_id, "+1555"), "123456", ttl).await?;
//! ```

pub mod keys;
pub mod pool;
pub mod store;

pub use keys::OtpKeys;
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use store::RedisKeyValueCache;
