//! Embedded key-value cache with per-entry expiry

use super::{CacheStore, StoreError, StoreResult};
use async_trait::async_trait;
use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Upper bound on stored keys before size-based eviction starts
const DEFAULT_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Each entry carries its own deadline; creates and updates re-read it
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, created_at: Instant) -> Option<Duration> {
        value.remaining(created_at)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.remaining(updated_at)
    }
}

/// In-process cache.
///
/// Expired entries are evicted by the cache's housekeeping, not only when
/// the key is touched again. `INCR` keeps an existing expiry, so a counter
/// started with a TTL resets once the window passes.
pub struct MemoryCache {
    entries: Cache<String, Entry>,
    /// Serialises read-modify-write commands
    write_lock: Mutex<()>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_keys: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_keys)
            .expire_after(EntryExpiry)
            .eviction_listener(|key: Arc<String>, _value, cause| {
                if cause == RemovalCause::Expired {
                    debug!(key = %key, "cache entry expired");
                }
            })
            .build();
        Self {
            entries,
            write_lock: Mutex::new(()),
        }
    }

    /// Remaining time to live, `None` for absent or persistent keys
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.get(key).await?.remaining(Instant::now())
    }

    /// Number of stored keys once pending evictions have run
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).await.map(|e| e.value))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let _guard = self.write_lock.lock().await;
        let (next, expires_at) = match self.entries.get(key).await {
            Some(entry) => {
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| StoreError::OperationFailed("value is not an integer or out of range".to_string()))?;
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| StoreError::OperationFailed("increment would overflow".to_string()))?;
                (next, entry.expires_at)
            }
            None => (1, None),
        };
        let entry = Entry {
            value: next.to_string(),
            expires_at,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut entry) = self.entries.get(key).await else {
            return Ok(false);
        };
        entry.expires_at = Some(Instant::now() + ttl);
        self.entries.insert(key.to_string(), entry).await;
        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
