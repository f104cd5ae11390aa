// src/cache/mod.rs

//! Cache-aside layer shared by every read path.
//!
//! The relational store is the source of truth. Entries here are advisory:
//! a failing backend degrades to a miss, and failed writes are only logged.

pub mod error;
pub mod keys;
pub mod memory;
pub mod redis_cache;
pub mod tier;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use error::CacheError;
pub use keys::CacheKey;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use tier::CacheTier;

/// Raw key-value backend with per-entry expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Read-through wrapper owning key construction and the tier policy.
#[derive(Clone)]
pub struct CacheAside {
    backend: Arc<dyn CacheBackend>,
    namespace: Arc<str>,
}

impl CacheAside {
    pub fn new(backend: Arc<dyn CacheBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: Arc::from(namespace.into()),
        }
    }

    /// Starts a key for `resource` under this cache's namespace.
    pub fn key(&self, resource: &str) -> CacheKey {
        CacheKey::new(&self.namespace, resource)
    }

    /// Looks up and decodes an entry. Backend and decode failures are
    /// reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw = match self.backend.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, "Cache degraded on get: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, "Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    /// Best-effort write. Never fails the caller.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, tier: CacheTier) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, "Failed to encode value for cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.backend.set(key.as_str(), &raw, tier.ttl()).await {
            tracing::warn!(key = %key, tier = tier.as_str(), "Cache degraded on set: {}", e);
        }
    }

    /// Drops an entry so the next read goes to the store.
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Err(e) = self.backend.delete(key.as_str()).await {
            tracing::warn!(key = %key, "Cache degraded on delete: {}", e);
        }
    }

    /// Serves `key` from the cache, or runs `load` against the store and
    /// caches its result at `tier`. Errors from `load` are returned as-is and
    /// nothing is cached for them.
    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        tier: CacheTier,
        load: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            tracing::debug!(key = %key, "cache hit");
            return Ok(hit);
        }

        let value = load().await?;
        self.set(key, &value, tier).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Backend that fails every call, as an unreachable Redis would.
    struct DownCache;

    #[async_trait]
    impl CacheBackend for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    fn memory() -> (Arc<MemoryCache>, CacheAside) {
        let backend = Arc::new(MemoryCache::new());
        let cache = CacheAside::new(backend.clone(), "test");
        (backend, cache)
    }

    #[tokio::test]
    async fn loads_once_then_serves_from_cache() {
        let (_, cache) = memory();
        let key = cache.key("answer_key").param("set_id", 1);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<String, ()> = cache
                .get_or_load(&key, CacheTier::Fast, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("abcd".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "abcd");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loader_errors_are_not_cached() {
        let (backend, cache) = memory();
        let key = cache.key("answer_key").param("set_id", 2);

        let first: Result<u32, &str> = cache
            .get_or_load(&key, CacheTier::Fast, || async { Err("store down") })
            .await;
        assert_eq!(first, Err("store down"));
        assert!(backend.is_empty().await);

        let second: Result<u32, &str> = cache
            .get_or_load(&key, CacheTier::Fast, || async { Ok(7) })
            .await;
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn unavailable_backend_falls_through_to_store() {
        let cache = CacheAside::new(Arc::new(DownCache), "test");
        let key = cache.key("answer_key").param("set_id", 3);

        assert!(cache.get::<String>(&key).await.is_none());
        cache.set(&key, &"ignored", CacheTier::Long).await;
        cache.invalidate(&key).await;

        let value: Result<i32, ()> = cache
            .get_or_load(&key, CacheTier::Fast, || async { Ok(42) })
            .await;
        assert_eq!(value, Ok(42));
    }

    #[tokio::test]
    async fn corrupt_entry_is_treated_as_miss() {
        let (backend, cache) = memory();
        let key = cache.key("answer_key").param("set_id", 4);
        backend
            .set(key.as_str(), "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get::<Vec<String>>(&key).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let (_, cache) = memory();
        let key = cache.key("answer_key").param("set_id", 5);
        cache.set(&key, &"stale".to_string(), CacheTier::Fast).await;

        cache.invalidate(&key).await;

        let value: Result<String, ()> = cache
            .get_or_load(&key, CacheTier::Fast, || async { Ok("fresh".to_string()) })
            .await;
        assert_eq!(value.unwrap(), "fresh");
    }

    #[test]
    fn keys_carry_namespace() {
        let cache = CacheAside::new(Arc::new(MemoryCache::new()), "misc");
        assert_eq!(cache.key("quiz:summary").param("user_id", 1).as_str(), "misc:quiz:summary|user_id=1");
    }
}
