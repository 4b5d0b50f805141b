//! Networked cache backend over Redis.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::{CacheError, CacheResult};
use crate::CacheBackend;

pub struct RedisCache {
    connection_manager: redis::aio::ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Connection {
            reason: e.to_string(),
        })?;

        let connection_manager =
            client
                .get_connection_manager()
                .await
                .map_err(|e| CacheError::Connection {
                    reason: e.to_string(),
                })?;

        tracing::info!(url = %url, "connected to Redis cache");

        Ok(Self { connection_manager })
    }

    fn backend_err(e: redis::RedisError) -> CacheError {
        CacheError::Backend {
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        conn.get(key).await.map_err(Self::backend_err)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        match ttl {
            Some(ttl) => conn
                .set_ex(key, value, ttl.as_secs().max(1))
                .await
                .map_err(Self::backend_err),
            None => conn.set(key, value).await.map_err(Self::backend_err),
        }
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        conn.del(key).await.map_err(Self::backend_err)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();
        conn.exists(key).await.map_err(Self::backend_err)
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.connection_manager.clone();
        conn.incr(key, 1).await.map_err(Self::backend_err)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        conn.expire(key, ttl.as_secs().max(1) as i64)
            .await
            .map_err(Self::backend_err)
    }

    async fn flush(&self) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(Self::backend_err)
    }
}
