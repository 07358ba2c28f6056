//! Response DTOs for the campus API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::service::Source;

/// Builds "<subject> retrieved successfully." with a provenance suffix.
pub fn retrieved_message(subject: &str, source: Source) -> String {
    match source {
        Source::Cache => format!("{} retrieved successfully from cache.", subject),
        Source::Store => format!("{} retrieved successfully.", subject),
    }
}

/// Response body carrying one payload.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    /// Human-readable outcome
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Response body carrying a collection and its size.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub message: String,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(message: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            message: message.into(),
            count: data.len(),
            data,
        }
    }
}

/// Response body with only a message (delete).
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Document store backend name
    pub store: String,
    /// Cache backend name
    pub cache: String,
    /// Cache counters, present when the backend keeps them
    #[serde(rename = "cacheStats", skip_serializing_if = "Option::is_none")]
    pub cache_stats: Option<CacheStatsResponse>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(store: &str, cache: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            store: store.to_string(),
            cache: cache.to_string(),
            cache_stats: None,
        }
    }

    pub fn with_cache_stats(mut self, stats: Option<CacheStats>) -> Self {
        self.cache_stats = stats.map(CacheStatsResponse::from);
        self
    }
}

/// Cache counters with the derived hit rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub counters: CacheStats,
    /// Hits / gets, 0.0 before the first read
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(counters: CacheStats) -> Self {
        Self {
            hit_rate: counters.hit_rate(),
            counters,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
