//! Cache Statistics Module
//!
//! Counts gateway traffic: reads, hits, misses, writes, deletes.

use serde::Serialize;

// == Cache Stats ==
/// Gateway call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls
    pub gets: u64,
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing or an expired value
    pub misses: u64,
    /// Number of `set` calls
    pub sets: u64,
    /// Number of `delete` calls, including deletes of absent keys
    pub deletes: u64,
    /// Entries dropped because their TTL elapsed
    pub expired: u64,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / gets, or 0.0 if nothing was read.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }

    /// Total gateway calls of any kind.
    pub fn calls(&self) -> u64 {
        self.gets + self.sets + self.deletes
    }

    pub fn record_hit(&mut self) {
        self.gets += 1;
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.gets += 1;
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.calls(), 0);
        assert_eq!(stats.expired, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.gets, 2);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_calls_counts_every_operation() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_set();
        stats.record_delete();
        stats.record_delete();
        assert_eq!(stats.calls(), 4);
    }

    #[test]
    fn test_record_expired() {
        let mut stats = CacheStats::new();
        stats.record_expired(3);
        stats.record_expired(2);
        assert_eq!(stats.expired, 5);
    }
}
