//! Cache Module
//!
//! Gateway for opaque serialized values addressed by string keys, each stored
//! with a fixed expiration. Serialization is the caller's concern.

mod entry;
pub mod keys;
mod memory;
mod redis_store;
mod stats;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub use keys::{validate_key_space, CacheKeys};
pub use memory::MemoryCache;
pub use redis_store::RedisCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Default time-to-live for cached payloads, in seconds
pub const DEFAULT_TTL_SECS: u64 = 3600;

// == Cache Gateway ==
/// Gateway to the cache.
///
/// Every operation fails with `CacheUnavailable` when the connection is not
/// established.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl` seconds, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Closes the connection. Later operations fail with `CacheUnavailable`.
    async fn close(&self) -> Result<()>;

    /// Traffic counters, for backends that keep them.
    async fn counters(&self) -> Option<CacheStats> {
        None
    }

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}
