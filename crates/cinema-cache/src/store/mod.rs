//! `KeyValueCache` implementation backed by Redis

mod redis_cache;

pub use redis_cache::RedisKeyValueCache;
