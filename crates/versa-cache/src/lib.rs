//! VERSA Cache — short-TTL key/value layer fronting expensive store
//! joins (context lists, tier lookups) and backing the rate-limit
//! counters.
//!
//! One [`CacheBackend`] interface, two implementations: an in-process
//! map with sweep-based expiry ([`MemoryCache`]) and a networked Redis
//! backend ([`RedisCache`]). The backend is selected by configuration;
//! callers hold an `Arc<dyn CacheBackend>` and never branch on which
//! one they got.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

mod error;
pub mod keys;
mod memory;
mod redis_backend;

pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use redis_backend::RedisCache;

/// Minimal cache contract. Values are strings; structured callers
/// serialize to JSON themselves.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value. `ttl = None` stores without expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    async fn del(&self, key: &str) -> CacheResult<()>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Atomically increment a counter key, creating it at 1. Returns
    /// the post-increment value.
    async fn incr(&self, key: &str) -> CacheResult<i64>;

    /// (Re)set a key's time-to-live.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()>;

    /// Drop everything. Test and operational tooling only.
    async fn flush(&self) -> CacheResult<()>;
}

/// Which backend to run against.
#[derive(Debug, Clone)]
pub enum CacheBackendKind {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    /// Sweep interval for the in-process backend.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Read `VERSA_CACHE_BACKEND` (`memory` | `redis`) and
    /// `VERSA_REDIS_URL`; unknown values fall back to the in-process
    /// backend with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        match std::env::var("VERSA_CACHE_BACKEND").as_deref() {
            Ok("redis") => {
                let url = std::env::var("VERSA_REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
                config.backend = CacheBackendKind::Redis { url };
            }
            Ok("memory") | Err(_) => {}
            Ok(other) => {
                tracing::warn!(backend = %other, "unknown cache backend, using memory");
            }
        }
        if let Ok(raw) = std::env::var("VERSA_CACHE_SWEEP_INTERVAL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.sweep_interval = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "invalid sweep interval, keeping default"),
            }
        }
        config
    }
}

/// Build the configured backend.
pub async fn connect(config: &CacheConfig) -> CacheResult<Arc<dyn CacheBackend>> {
    match &config.backend {
        CacheBackendKind::Memory => Ok(Arc::new(MemoryCache::new(config.sweep_interval))),
        CacheBackendKind::Redis { url } => Ok(Arc::new(RedisCache::connect(url).await?)),
    }
}
