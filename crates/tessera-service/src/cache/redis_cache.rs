//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tessera_config::RedisConfig;
use tessera_core::{TesseraError, TesseraResult};
use tracing::{debug, info};

/// Creates a Redis connection pool and checks that the server answers.
pub async fn create_redis_pool(config: &RedisConfig) -> TesseraResult<Arc<Pool>> {
    info!("Creating Redis connection pool...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| TesseraError::Configuration(format!("Invalid Redis config: {e}")))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| TesseraError::Cache(format!("Failed to create Redis pool: {e}")))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|e| TesseraError::Cache(format!("Failed to get Redis connection: {e}")))?;
    deadpool_redis::redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await
        .map_err(|e| TesseraError::Cache(format!("Redis ping failed: {e}")))?;

    info!("Redis connection pool created successfully");
    Ok(Arc::new(pool))
}

/// Redis-based cache service.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache service: every read misses, every write is dropped.
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    async fn get_conn(&self) -> TesseraResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                TesseraError::Cache(format!("Failed to get Redis connection: {e}"))
            }),
            None => Err(TesseraError::Cache("Cache is disabled".to_string())),
        }
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            TesseraError::Cache(format!("Failed to get key '{key}': {e}"))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TesseraResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;

        match ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        }
        .map_err(|e| TesseraError::Cache(format!("Failed to set key '{key}': {e}")))?;

        debug!("Cached key '{}' with TTL {:?}", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> TesseraResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            TesseraError::Cache(format!("Failed to delete key '{key}': {e}"))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.pool.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_misses_and_drops_writes() {
        let cache = RedisCacheService::disabled();
        assert!(!cache.is_enabled());

        cache.set_raw("k", "v", None).await.unwrap();
        assert_eq!(cache.get_raw("k").await.unwrap(), None);
        assert!(!cache.delete("k").await.unwrap());
    }
}
