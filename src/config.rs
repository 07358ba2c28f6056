//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::{validate_key_space, CacheKeys, DEFAULT_TTL_SECS};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds applied to every cache entry
    pub cache_ttl: u64,
    /// Redis connection URL; the in-memory cache is used when unset
    pub redis_uri: Option<String>,
    /// MongoDB connection URI; the in-memory store is used when unset
    pub mongodb_uri: Option<String>,
    /// Database name of the document store
    pub database_name: String,
    /// In-memory cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// Cache keys for courses
    pub course_keys: CacheKeys,
    /// Cache keys for students
    pub student_keys: CacheKeys,
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Cache entry TTL in seconds (default: 3600)
    /// - `REDIS_URI` - Redis URL (default: unset, in-memory cache)
    /// - `MONGODB_URI` - MongoDB URI (default: unset, in-memory store)
    /// - `MONGODB_DB_NAME` or `DATABASE_NAME` - Database name (default: campus)
    /// - `CLEANUP_INTERVAL` - In-memory cache sweep frequency in seconds (default: 60)
    /// - `REDIS_KEY_ALL_COURSES`, `REDIS_KEY_COURSE_PREFIX`, `REDIS_KEY_COURSE_STATS`
    /// - `REDIS_KEY_ALL_STUDENTS`, `REDIS_KEY_STUDENT_PREFIX`, `REDIS_KEY_STUDENT_STATS`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parsed("PORT", defaults.server_port),
            cache_ttl: parsed("CACHE_TTL", defaults.cache_ttl),
            redis_uri: non_empty("REDIS_URI"),
            mongodb_uri: non_empty("MONGODB_URI"),
            database_name: non_empty("MONGODB_DB_NAME")
                .or_else(|| non_empty("DATABASE_NAME"))
                .unwrap_or(defaults.database_name),
            cleanup_interval: parsed("CLEANUP_INTERVAL", defaults.cleanup_interval),
            course_keys: CacheKeys::from_env(
                defaults.course_keys,
                "REDIS_KEY_ALL_COURSES",
                "REDIS_KEY_COURSE_PREFIX",
                "REDIS_KEY_COURSE_STATS",
            ),
            student_keys: CacheKeys::from_env(
                defaults.student_keys,
                "REDIS_KEY_ALL_STUDENTS",
                "REDIS_KEY_STUDENT_PREFIX",
                "REDIS_KEY_STUDENT_STATS",
            ),
        }
    }

    /// Rejects settings the service cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl == 0 {
            return Err("CACHE_TTL must be greater than zero".to_string());
        }
        if self.cleanup_interval == 0 {
            return Err("CLEANUP_INTERVAL must be greater than zero".to_string());
        }
        validate_key_space(&[&self.course_keys, &self.student_keys])
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl: DEFAULT_TTL_SECS,
            redis_uri: None,
            mongodb_uri: None,
            database_name: "campus".to_string(),
            cleanup_interval: 60,
            course_keys: CacheKeys::courses(),
            student_keys: CacheKeys::students(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_ttl, 3600);
        assert!(config.redis_uri.is_none());
        assert!(config.mongodb_uri.is_none());
        assert_eq!(config.database_name, "campus");
        assert_eq!(config.course_keys, CacheKeys::courses());
        assert_eq!(config.student_keys, CacheKeys::students());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("PORT");
        env::remove_var("CACHE_TTL");
        env::remove_var("REDIS_URI");
        env::remove_var("MONGODB_URI");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_ttl, 3600);
        assert!(config.redis_uri.is_none());
        assert!(config.mongodb_uri.is_none());
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = Config {
            cache_ttl: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_colliding_prefixes_rejected() {
        let config = Config {
            student_keys: CacheKeys::new("student:all", "course:", "stats:students"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
