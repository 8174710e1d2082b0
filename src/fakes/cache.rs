use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache item not found")]
    NotFound,
    #[error("cache item could not be (de)serialized: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Key/value cache used by middleware for short-lived state.
pub trait RemoteCache: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Vec<u8>, CacheError>;
    /// `ttl = None` keeps the item until deleted.
    fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError>;
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Typed access over any [`RemoteCache`]; values are stored as JSON.
pub trait RemoteCacheExt: RemoteCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        let raw = self.get_raw(key)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.set_raw(key, serde_json::to_vec(value)?, ttl)
    }
}

impl<C: RemoteCache + ?Sized> RemoteCacheExt for C {}

#[derive(Debug, Clone)]
struct CacheItem {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheItem {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process [`RemoteCache`]. Expired items are evicted lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryRemoteCache {
    items: Mutex<HashMap<String, CacheItem>>,
}

impl InMemoryRemoteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }
}

impl RemoteCache for InMemoryRemoteCache {
    fn get_raw(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let mut items = self.items.lock();
        let expired = match items.get(key) {
            Some(item) => item.is_expired(Instant::now()),
            None => return Err(CacheError::NotFound),
        };
        if expired {
            debug!(key = %key, "Cache item expired");
            items.remove(key);
            return Err(CacheError::NotFound);
        }
        items
            .get(key)
            .map(|item| item.value.clone())
            .ok_or(CacheError::NotFound)
    }

    fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires_at = ttl.map(|t| Instant::now() + t);
        self.items
            .lock()
            .insert(key.to_string(), CacheItem { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user_id: i64,
    }

    #[test]
    fn test_typed_round_trip() {
        let cache = InMemoryRemoteCache::new();
        cache.set("s", &Session { user_id: 4 }, None).unwrap();
        let got: Session = cache.get("s").unwrap();
        assert_eq!(got, Session { user_id: 4 });
    }

    #[test]
    fn test_missing_and_deleted() {
        let cache = InMemoryRemoteCache::new();
        assert!(matches!(cache.get::<Session>("nope"), Err(CacheError::NotFound)));
        cache.set("k", &1, None).unwrap();
        cache.delete("k").unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_item_is_evicted() {
        let cache = InMemoryRemoteCache::new();
        cache.set("k", &"v", Some(Duration::ZERO)).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(matches!(cache.get::<String>("k"), Err(CacheError::NotFound)));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_wrong_type_is_codec_error() {
        let cache = InMemoryRemoteCache::new();
        cache.set("k", &"text", None).unwrap();
        assert!(matches!(cache.get::<Session>("k"), Err(CacheError::Codec(_))));
    }

    #[test]
    fn test_dyn_cache_has_typed_access() {
        let cache: Box<dyn RemoteCache> = Box::new(InMemoryRemoteCache::new());
        cache.set("n", &42_u32, None).unwrap();
        assert_eq!(cache.get::<u32>("n").unwrap(), 42);
    }
}
