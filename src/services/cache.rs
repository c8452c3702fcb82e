// src/services/cache.rs
// DOCUMENTATION: In-memory TTL cache for public city set responses
// PURPOSE: Avoid re-running the eager-loading queries for every visitor

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::models::Cursor;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe cache of serialized responses
/// DOCUMENTATION: Cleared wholesale by every photo mutation, since any
/// create/update/remove can change a city set or its member photos.
/// Each clear starts a new generation; a response loaded during an older
/// generation is never stored.
pub struct ResponseCache {
    store: Arc<RwLock<HashMap<String, CacheEntry<Value>>>>,
    default_ttl: Duration,
    generation: AtomicU64,
}

impl ResponseCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
            generation: AtomicU64::new(0),
        }
    }

    /// Key for a city set listing page
    pub fn city_sets_key(cursor: Option<&Cursor>, limit: i64) -> String {
        match cursor {
            Some(c) => format!("city_sets:{}:{}:{}", c.updated_at.timestamp_micros(), c.id, limit),
            None => format!("city_sets:start:{}", limit),
        }
    }

    /// Key for a single city lookup
    pub fn city_key(city: &str) -> String {
        format!("city:{}", city)
    }

    /// Get cached value
    pub async fn get(&self, key: &str) -> Option<Value> {
        let store = self.store.read().await;

        if let Some(entry) = store.get(key) {
            if !entry.is_expired() {
                log::debug!("Cache HIT for key: {}", key);
                return Some(entry.data.clone());
            } else {
                log::debug!("Cache EXPIRED for key: {}", key);
            }
        } else {
            log::debug!("Cache MISS for key: {}", key);
        }

        None
    }

    /// Current generation; capture it before loading a response to `put`
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Serialize a response and store it if no clear happened since
    /// `generation` was captured. Returns the serialized JSON either way.
    pub async fn put<T: Serialize>(
        &self,
        key: String,
        response: &T,
        generation: u64,
    ) -> Value {
        let value = serde_json::to_value(response).unwrap_or(Value::Null);
        if value.is_null() {
            return value;
        }

        let mut store = self.store.write().await;
        if self.generation.load(Ordering::Acquire) != generation {
            log::debug!("Cache SKIP for key: {} (cleared while loading)", key);
            return value;
        }
        store.insert(key, CacheEntry::new(value.clone(), self.default_ttl));
        value
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Clear all cache entries
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let count = store.len();
        store.clear();
        if count > 0 {
            log::debug!("Cache cleared: {} entries removed", count);
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<ResponseCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = ResponseCache::new(60);
        let key = ResponseCache::city_key("Paris");

        cache.put(key.clone(), &json!({"city": "Paris"}), cache.generation()).await;
        let result = cache.get(&key).await;

        assert_eq!(result, Some(json!({"city": "Paris"})));
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = ResponseCache::new(1);
        let key = "city:Paris".to_string();

        cache.put(key.clone(), &json!({"city": "Paris"}), cache.generation()).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_cleanup_and_clear() {
        let cache = ResponseCache::new(1);

        cache.put("a".to_string(), &json!(1), cache.generation()).await;
        cache.put("b".to_string(), &json!(2), cache.generation()).await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        cache.cleanup().await;
        assert_eq!(cache.len().await, 0);

        cache.put("c".to_string(), &json!(3), cache.generation()).await;
        cache.clear().await;
        assert!(cache.get("c").await.is_none());
    }

    #[tokio::test]
    async fn test_put_returns_serialized_value() {
        let cache = ResponseCache::new(60);
        let generation = cache.generation();
        let value = cache
            .put("city:Lyon".to_string(), &vec![1, 2, 3], generation)
            .await;

        assert_eq!(value, json!([1, 2, 3]));
        assert_eq!(cache.get("city:Lyon").await, Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_put_after_clear_is_not_stored() {
        let cache = ResponseCache::new(300);

        // Reader captures the generation, then a removal clears the cache
        // before the reader's snapshot is stored.
        let generation = cache.generation();
        cache.clear().await;

        let stale = json!({"city": "Paris", "photoCount": 1});
        let value = cache
            .put(ResponseCache::city_key("Paris"), &stale, generation)
            .await;

        assert_eq!(value, stale);
        assert!(cache.get(&ResponseCache::city_key("Paris")).await.is_none());

        // A reader that started after the clear can store again
        let generation = cache.generation();
        cache
            .put(ResponseCache::city_key("Paris"), &json!(null), generation)
            .await;
        cache
            .put(ResponseCache::city_key("Lyon"), &stale, generation)
            .await;
        assert!(cache.get(&ResponseCache::city_key("Paris")).await.is_none());
        assert!(cache.get(&ResponseCache::city_key("Lyon")).await.is_some());
    }

    #[test]
    fn test_city_sets_key() {
        let cursor = Cursor {
            id: Uuid::new_v4(),
            updated_at: Utc::now(),
        };

        assert_eq!(ResponseCache::city_sets_key(None, 10), "city_sets:start:10");
        assert_ne!(
            ResponseCache::city_sets_key(Some(&cursor), 10),
            ResponseCache::city_sets_key(Some(&cursor), 20)
        );
    }
}
