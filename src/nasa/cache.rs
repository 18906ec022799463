use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Concurrent in-memory cache of JSON responses with per-entry expiry
///
/// Expired entries are dropped lazily on lookup and in bulk by
/// [`ResponseCache::purge_expired`].
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` if it has not expired
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        // The shard guard must be released before removing from the same shard
        let hit = self
            .entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.expires_at));

        match hit {
            Some((value, expires_at)) if expires_at > now => Some(value),
            Some(_) => {
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key` for `ttl`
    pub fn insert(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Drops every expired entry and returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let cache = ResponseCache::new();
        cache.insert("nasa_apod_5", json!([{"title": "Nebula"}]), Duration::from_secs(60));

        assert_eq!(cache.get("nasa_apod_5"), Some(json!([{"title": "Nebula"}])));
        assert_eq!(cache.get("nasa_apod_6"), None);
    }

    #[test]
    fn test_expired_entry_is_dropped_on_get() {
        let cache = ResponseCache::new();
        cache.insert("nasa_epic_latest", json!([]), Duration::ZERO);

        assert_eq!(cache.get("nasa_epic_latest"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces_existing() {
        let cache = ResponseCache::new();
        cache.insert("key", json!(1), Duration::from_secs(60));
        cache.insert("key", json!(2), Duration::from_secs(60));

        assert_eq!(cache.get("key"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let cache = ResponseCache::new();
        cache.insert("stale-1", json!(1), Duration::ZERO);
        cache.insert("stale-2", json!(2), Duration::ZERO);
        cache.insert("fresh", json!(3), Duration::from_secs(60));

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(json!(3)));
    }
}
