//! Caching infrastructure for the service layer.
//!
//! Users are cached as JSON under two keys, by id and by email. Redis is
//! the production backend; the in-memory cache serves local runs and tests.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::InMemoryCache;
pub use redis_cache::{create_redis_pool, RedisCacheService, RedisCacheServiceParameters};
