//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use std::time::Duration;
use tessera_core::{Interface, TesseraResult};

/// Key/value cache holding JSON strings.
///
/// A miss is `Ok(None)`; an unreachable backend is `Err`. Callers decide
/// whether an error is fatal.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>>;

    /// Set a raw JSON value. `ttl: None` stores the entry without expiry.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TesseraResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> TesseraResult<bool>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value from the cache.
    ///
    /// An entry that does not decode as `T` is an error, not a miss.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> TesseraResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> TesseraResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

// Blanket implementation for all CacheInterface implementations
impl<T: CacheInterface + ?Sized> CacheExt for T {}
