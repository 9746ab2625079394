//! Key-value cache port
//!
//! The cache is never authoritative. Callers decide per use whether an error
//! fails open or closed.

use async_trait::async_trait;
use std::time::Duration;

use crate::traits::RepoResult;

#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> RepoResult<()>;

    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Returns whether the key existed
    async fn delete(&self, key: &str) -> RepoResult<bool>;

    /// Remaining TTL; `None` when the key is absent or has no expiry
    async fn ttl_remaining(&self, key: &str) -> RepoResult<Option<Duration>>;

    /// Increment a counter, starting its TTL window on the first increment
    async fn increment(&self, key: &str, window: Duration) -> RepoResult<i64>;
}
