//! In-process cache for local runs and tests, backed by `moka`.

use super::CacheInterface;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use shaku::Component;
use std::time::{Duration, Instant};
use tessera_core::TesseraResult;
use tracing::debug;

/// A cached value and its time to live.
#[derive(Debug, Clone)]
pub struct Entry {
    value: String,
    ttl: Option<Duration>,
}

/// Each entry carries its own TTL; `None` never expires.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    // An overwrite restarts the clock with the new entry's TTL.
    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

fn new_entries() -> Cache<String, Entry> {
    Cache::builder()
        .name("tessera")
        .expire_after(PerEntryTtl)
        .build()
}

/// Cache held in process memory. Expired entries are evicted by moka's
/// housekeeping, not only when read.
#[derive(Component, Clone)]
#[shaku(interface = CacheInterface)]
pub struct InMemoryCache {
    #[shaku(default = new_entries())]
    entries: Cache<String, Entry>,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: new_entries(),
        }
    }

    /// Number of live entries, after pending evictions have run.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns `true` if a live entry exists under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheInterface for InMemoryCache {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>> {
        match self.entries.get(key).await {
            Some(entry) => {
                debug!("Cache hit for key '{}'", key);
                Ok(Some(entry.value))
            }
            None => {
                debug!("Cache miss for key '{}'", key);
                Ok(None)
            }
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TesseraResult<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> TesseraResult<bool> {
        Ok(self.entries.remove(key).await.is_some())
    }
}
