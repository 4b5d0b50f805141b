//! In-process cache backend.
//!
//! Expiry is enforced twice: a periodic sweep task evicts everything
//! past its deadline, and reads check the deadline themselves so a
//! just-expired entry is never served between sweeps.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{CacheError, CacheResult};
use crate::CacheBackend;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create the cache and start its sweep task. The task holds a weak
    /// handle and exits once the cache is dropped.
    pub fn new(sweep_interval: Duration) -> Self {
        let entries: Arc<DashMap<String, Entry>> = Arc::new(DashMap::new());

        let weak = Arc::downgrade(&entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(entries) = weak.upgrade() else {
                    break;
                };
                let now = Instant::now();
                entries.retain(|_, entry| !entry.is_expired(now));
            }
        });

        Self { entries }
    }

    /// Number of live (unexpired) entries. Test hook.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        // Lazy expiry: evict on read rather than waiting for the sweep.
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(Instant::now()) {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: "0".into(),
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = "0".into();
            entry.expires_at = None;
        }
        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| CacheError::NotACounter {
                value: entry.value.clone(),
            })?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn flush(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> MemoryCache {
        // Long sweep interval: these tests exercise the lazy path.
        MemoryCache::new(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let cache = cache();
        cache.set("k", "v", None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_read() {
        let cache = cache();
        cache
            .set("k", "v", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn sweep_evicts_without_reads() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        cache
            .set("k", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn incr_counts_from_one() {
        let cache = cache();
        assert_eq!(cache.incr("c").await.unwrap(), 1);
        assert_eq!(cache.incr("c").await.unwrap(), 2);
        assert_eq!(cache.incr("c").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn incr_restarts_after_expiry() {
        let cache = cache();
        cache.incr("c").await.unwrap();
        cache
            .expire("c", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.incr("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn incr_rejects_non_counter() {
        let cache = cache();
        cache.set("k", "not-a-number", None).await.unwrap();
        assert!(matches!(
            cache.incr("k").await,
            Err(CacheError::NotACounter { .. })
        ));
    }

    #[tokio::test]
    async fn del_and_flush() {
        let cache = cache();
        cache.set("a", "1", None).await.unwrap();
        cache.set("b", "2", None).await.unwrap();
        cache.del("a").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        cache.flush().await.unwrap();
        assert!(cache.is_empty());
    }
}
