//! Cache Key Scheme
//!
//! Maps (entity type, scope) to cache key strings. Each entity type owns
//! three shapes: a singleton "all records" key, a singleton "stats" key and
//! a per-record key built from a prefix and the record id.

use std::collections::HashSet;
use std::env;

use crate::store::ObjectId;

// == Cache Keys ==
/// Key triple for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    all: String,
    record_prefix: String,
    stats: String,
}

impl CacheKeys {
    pub fn new(
        all: impl Into<String>,
        record_prefix: impl Into<String>,
        stats: impl Into<String>,
    ) -> Self {
        Self {
            all: all.into(),
            record_prefix: record_prefix.into(),
            stats: stats.into(),
        }
    }

    /// Default course keys: `course:all`, `course:<id>`, `stats:courses`.
    pub fn courses() -> Self {
        Self::new("course:all", "course:", "stats:courses")
    }

    /// Default student keys: `student:all`, `student:<id>`, `stats:students`.
    pub fn students() -> Self {
        Self::new("student:all", "student:", "stats:students")
    }

    /// Overrides each shape from an environment variable when it is set and
    /// non-empty.
    pub fn from_env(defaults: Self, all_var: &str, prefix_var: &str, stats_var: &str) -> Self {
        let read = |name: &str, fallback: String| {
            env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            all: read(all_var, defaults.all),
            record_prefix: read(prefix_var, defaults.record_prefix),
            stats: read(stats_var, defaults.stats),
        }
    }

    /// Key holding the serialized collection.
    pub fn all(&self) -> &str {
        &self.all
    }

    /// Key holding the serialized statistics summary.
    pub fn stats(&self) -> &str {
        &self.stats
    }

    pub fn record_prefix(&self) -> &str {
        &self.record_prefix
    }

    /// Key holding one serialized record.
    pub fn record(&self, id: &ObjectId) -> String {
        format!("{}{}", self.record_prefix, id)
    }

    /// Returns true if `key` has the shape of a per-record key of this type.
    pub fn is_record_key(&self, key: &str) -> bool {
        key.strip_prefix(self.record_prefix.as_str())
            .map_or(false, ObjectId::is_valid)
    }
}

// == Key Space Validation ==
/// Checks that the key triples of all entity types can never collide.
///
/// Record keys are `prefix + 24 hex chars`, so two record keys of different
/// types are equal only if their prefixes are equal. Singleton keys must be
/// unique and must not look like any record key.
pub fn validate_key_space(sets: &[&CacheKeys]) -> Result<(), String> {
    let mut prefixes = HashSet::new();
    let mut singletons = HashSet::new();

    for keys in sets {
        if !prefixes.insert(keys.record_prefix()) {
            return Err(format!(
                "record key prefix '{}' is used by more than one entity type",
                keys.record_prefix()
            ));
        }
        for key in [keys.all(), keys.stats()] {
            if key.is_empty() {
                return Err("singleton cache keys must not be empty".to_string());
            }
            if !singletons.insert(key) {
                return Err(format!("cache key '{}' is used more than once", key));
            }
        }
    }

    for key in &singletons {
        if let Some(owner) = sets.iter().find(|keys| keys.is_record_key(key)) {
            return Err(format!(
                "cache key '{}' is indistinguishable from a record key with prefix '{}'",
                key,
                owner.record_prefix()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_course_keys() {
        let keys = CacheKeys::courses();
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();

        assert_eq!(keys.all(), "course:all");
        assert_eq!(keys.stats(), "stats:courses");
        assert_eq!(keys.record(&id), "course:507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_default_student_keys() {
        let keys = CacheKeys::students();
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();

        assert_eq!(keys.all(), "student:all");
        assert_eq!(keys.stats(), "stats:students");
        assert_eq!(keys.record(&id), "student:507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_record_key_is_deterministic() {
        let keys = CacheKeys::courses();
        let id = ObjectId::new();
        assert_eq!(keys.record(&id), keys.record(&id.to_hex().parse().unwrap()));
    }

    #[test]
    fn test_all_key_is_not_a_record_key() {
        let keys = CacheKeys::courses();
        assert!(!keys.is_record_key(keys.all()));
        assert!(keys.is_record_key(&keys.record(&ObjectId::new())));
    }

    #[test]
    fn test_defaults_are_disjoint() {
        assert!(validate_key_space(&[&CacheKeys::courses(), &CacheKeys::students()]).is_ok());
    }

    #[test]
    fn test_shared_prefix_rejected() {
        let a = CacheKeys::new("a:all", "item:", "stats:a");
        let b = CacheKeys::new("b:all", "item:", "stats:b");
        assert!(validate_key_space(&[&a, &b]).is_err());
    }

    #[test]
    fn test_shared_singleton_rejected() {
        let a = CacheKeys::new("all", "a:", "stats");
        let b = CacheKeys::new("all", "b:", "stats:b");
        assert!(validate_key_space(&[&a, &b]).is_err());
    }

    #[test]
    fn test_singleton_shaped_like_record_rejected() {
        let a = CacheKeys::new("a:507f1f77bcf86cd799439011", "a:", "stats:a");
        assert!(validate_key_space(&[&a]).is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        env::set_var("TEST_KEYS_ALL", "c:everything");
        env::set_var("TEST_KEYS_PREFIX", "");
        env::remove_var("TEST_KEYS_STATS");

        let keys = CacheKeys::from_env(
            CacheKeys::courses(),
            "TEST_KEYS_ALL",
            "TEST_KEYS_PREFIX",
            "TEST_KEYS_STATS",
        );

        assert_eq!(keys.all(), "c:everything");
        assert_eq!(keys.record_prefix(), "course:");
        assert_eq!(keys.stats(), "stats:courses");
    }
}
