//! Redis Cache Module
//!
//! Cache gateway over a shared Redis connection manager.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::CacheGateway;
use crate::error::{AppError, Result};

fn operation_failed(operation: &str, key: &str, err: RedisError) -> AppError {
    error!(operation, key, error = %err, "redis operation failed");
    AppError::CacheOperationFailed(format!("{} {}: {}", operation, key, err))
}

// == Redis Cache ==
/// Redis-backed cache.
///
/// The connection is established once by [`RedisCache::connect`] and shared
/// by every caller. Commands are not retried.
pub struct RedisCache {
    /// `None` once closed
    connection: RwLock<Option<ConnectionManager>>,
}

impl RedisCache {
    /// Opens a connection and verifies it with `PING`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::CacheUnavailable(format!("invalid redis url: {}", e)))?;

        let mut manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::CacheUnavailable(format!("redis connection failed: {}", e)))?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .map_err(|e| AppError::CacheUnavailable(format!("redis ping failed: {}", e)))?;
        debug!(reply = %pong, "redis ping");

        info!("Redis cache connected");

        Ok(Self {
            connection: RwLock::new(Some(manager)),
        })
    }

    /// Returns a handle to the shared connection.
    async fn connection(&self) -> Result<ConnectionManager> {
        self.connection.read().await.clone().ok_or_else(|| {
            error!("redis cache used after close");
            AppError::CacheUnavailable("redis connection is closed".to_string())
        })
    }
}

#[async_trait]
impl CacheGateway for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| operation_failed("GET", key, e))?;

        debug!(key, hit = value.is_some(), "redis get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl)
            .await
            .map_err(|e| operation_failed("SET", key, e))?;

        debug!(key, ttl, "redis set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|e| operation_failed("DEL", key, e))?;

        debug!(key, removed, "redis delete");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.connection.write().await.take().is_some() {
            info!("Redis cache closed");
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
