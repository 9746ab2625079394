//! Redis adapter for the core `KeyValueCache` port

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use cinema_core::traits::{KeyValueCache, RepoResult};
use cinema_core::DomainError;

use crate::pool::{RedisPool, RedisPoolError};

fn cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

/// Redis-backed key-value cache
#[derive(Clone, Debug)]
pub struct RedisKeyValueCache {
    pool: RedisPool,
}

impl RedisKeyValueCache {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueCache for RedisKeyValueCache {
    #[instrument(skip(self, value))]
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> RepoResult<()> {
        self.pool.set_ex(key, value, ttl).await.map_err(cache_error)
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.pool.get_string(key).await.map_err(cache_error)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> RepoResult<bool> {
        self.pool.delete(key).await.map_err(cache_error)
    }

    #[instrument(skip(self))]
    async fn ttl_remaining(&self, key: &str) -> RepoResult<Option<Duration>> {
        self.pool.ttl(key).await.map_err(cache_error)
    }

    #[instrument(skip(self))]
    async fn increment(&self, key: &str, window: Duration) -> RepoResult<i64> {
        self.pool
            .incr_with_window(key, window)
            .await
            .map_err(cache_error)
    }
}
