//! Bounded LRU cache of resolved shard connections.
//!
//! Entries never expire by time. Correctness relies on writers that change
//! an entity's shard assignment invalidating its entry.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Cache key for a `(pool, hint)` pair: `pool:hint`.
pub fn lookup_cache_key(pool: &str, hint_id: i64) -> String {
    format!("{}:{}", pool, hint_id)
}

/// Thread-safe string-keyed LRU cache.
#[derive(Debug)]
pub struct LookupCache<V> {
    inner: Mutex<LruCache<String, V>>,
}

impl<V: Clone> LookupCache<V> {
    /// Create a cache holding at most `max_items` entries (at least one).
    pub fn new(max_items: usize) -> Self {
        let capacity = NonZeroUsize::new(max_items).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, V>> {
        // Entries are only ever replaced whole, so a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Insert or replace `key`, evicting the least recently used entry when full.
    pub fn set(&self, key: String, value: V) {
        self.lock().put(key, value);
    }

    /// Remove `key`. Removing an absent key is a no-op.
    pub fn del(&self, key: &str) {
        self.lock().pop(key);
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}
