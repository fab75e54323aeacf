//! In-memory LRU cache.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::traits::{AsyncCache, Cache};
use crate::types::CacheEntry;
use crate::utils::Completion;

/// Bounded in-memory cache; the least recently used entry is evicted once
/// `capacity` entries are held.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl InMemoryCache {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Cache for InMemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries().get(key).cloned()
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        if let Some((evicted, _)) = self.entries().push(key.to_string(), entry)
            && evicted != key
        {
            tracing::trace!(key = %evicted, "evicted cache entry");
        }
    }

    fn invalidate(&self, key: &str, full_expire: bool) {
        if let Some(entry) = self.entries().get_mut(key) {
            entry.soft_ttl = 0;
            if full_expire {
                entry.ttl = 0;
            }
        }
    }

    fn remove(&self, key: &str) {
        self.entries().pop(key);
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

impl AsyncCache for InMemoryCache {
    fn get(&self, key: &str, completion: Completion<Option<CacheEntry>>) {
        completion.complete(Cache::get(self, key));
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        Cache::put(self, key, entry);
    }

    fn invalidate(&self, key: &str, full_expire: bool) {
        Cache::invalidate(self, key, full_expire);
    }

    fn remove(&self, key: &str) {
        Cache::remove(self, key);
    }

    fn clear(&self) {
        Cache::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SyncCache;
    use crate::utils::BlockingAdapter;

    fn entry(body: &'static str) -> CacheEntry {
        CacheEntry::new(body).with_ttl(i64::MAX, i64::MAX)
    }

    #[test]
    fn put_then_get() {
        let cache = InMemoryCache::new(4);
        Cache::put(&cache, "a", entry("alpha"));
        let hit = Cache::get(&cache, "a").unwrap();
        assert_eq!(hit.data.as_ref(), b"alpha");
        assert!(Cache::get(&cache, "b").is_none());
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = InMemoryCache::new(2);
        Cache::put(&cache, "a", entry("1"));
        Cache::put(&cache, "b", entry("2"));
        // touch "a" so "b" becomes the oldest
        Cache::get(&cache, "a");
        Cache::put(&cache, "c", entry("3"));

        assert_eq!(cache.len(), 2);
        assert!(Cache::get(&cache, "b").is_none());
        assert!(Cache::get(&cache, "a").is_some());
        assert!(Cache::get(&cache, "c").is_some());
    }

    #[test]
    fn soft_invalidate_keeps_entry_usable() {
        let cache = InMemoryCache::new(2);
        Cache::put(&cache, "a", entry("1"));
        Cache::invalidate(&cache, "a", false);

        let hit = Cache::get(&cache, "a").unwrap();
        assert!(hit.refresh_needed());
        assert!(!hit.is_expired());
    }

    #[test]
    fn full_invalidate_expires_entry() {
        let cache = InMemoryCache::new(2);
        Cache::put(&cache, "a", entry("1"));
        Cache::invalidate(&cache, "a", true);

        let hit = Cache::get(&cache, "a").unwrap();
        assert!(hit.refresh_needed());
        assert!(hit.is_expired());
    }

    #[test]
    fn remove_and_clear() {
        let cache = InMemoryCache::new(0);
        Cache::put(&cache, "a", entry("1"));
        Cache::remove(&cache, "a");
        assert!(cache.is_empty());

        Cache::put(&cache, "b", entry("2"));
        Cache::clear(&cache);
        assert!(cache.is_empty());
    }

    #[test]
    fn sync_cache_blocks_on_callback_lookup() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let cache = SyncCache::new(
            InMemoryCache::new(4),
            BlockingAdapter::new(runtime.handle().clone()),
        );

        cache.initialize();
        Cache::put(&cache, "a", entry("cached"));
        assert_eq!(Cache::get(&cache, "a").unwrap().data.as_ref(), b"cached");
        assert!(Cache::get(&cache, "missing").is_none());
    }
}
