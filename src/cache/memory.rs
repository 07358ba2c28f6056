//! In-Memory Cache Module
//!
//! HashMap-backed cache gateway with TTL expiration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::{CacheEntry, CacheGateway, CacheStats};
use crate::error::{AppError, Result};

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

// == Memory Cache ==
/// Cache kept in process memory.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`MemoryCache::purge_expired`].
#[derive(Debug)]
pub struct MemoryCache {
    state: RwLock<CacheState>,
    /// False once the cache has been closed
    connected: AtomicBool,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a connected, empty cache.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            connected: AtomicBool::new(true),
        }
    }

    // == Stats ==
    /// Returns current gateway statistics.
    pub async fn stats(&self) -> CacheStats {
        self.state.read().await.stats
    }

    /// Returns true if a live entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map_or(false, |entry| !entry.is_expired())
    }

    /// Returns the raw entry without touching statistics.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.state.read().await.entries.get(key).cloned()
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired());

        let removed = before - state.entries.len();
        state.stats.record_expired(removed);
        removed
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            error!("memory cache used after close");
            Err(AppError::CacheUnavailable(
                "cache connection is closed".to_string(),
            ))
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_connected()?;
        let mut state = self.state.write().await;

        // Outer None: absent. Inner None: present but expired.
        let lookup = state
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired()).then(|| entry.value.clone()));

        match lookup {
            Some(None) => {
                state.entries.remove(key);
                state.stats.record_expired(1);
                state.stats.record_miss();
                debug!(key, "cache entry expired");
                Ok(None)
            }
            Some(Some(value)) => {
                state.stats.record_hit();
                debug!(key, "cache hit");
                Ok(Some(value))
            }
            None => {
                state.stats.record_miss();
                debug!(key, "cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()> {
        self.ensure_connected()?;
        let mut state = self.state.write().await;

        state
            .entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        state.stats.record_set();
        debug!(key, ttl, "cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_connected()?;
        let mut state = self.state.write().await;

        let existed = state.entries.remove(key).is_some();
        state.stats.record_delete();
        debug!(key, existed, "cache delete");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::AcqRel) {
            info!("memory cache closed");
        }
        Ok(())
    }

    async fn counters(&self) -> Option<CacheStats> {
        Some(self.stats().await)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
