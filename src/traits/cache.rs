//! Cache capability traits

use std::sync::Arc;

use crate::types::CacheEntry;
use crate::utils::{BlockingAdapter, Completion};

/// Blocking cache.
pub trait Cache: Send + Sync {
    /// Prepare the cache for use. May be slow.
    fn initialize(&self) {}

    fn get(&self, key: &str) -> Option<CacheEntry>;

    fn put(&self, key: &str, entry: CacheEntry);

    /// Mark an entry stale. With `full_expire` it is also hard-expired.
    fn invalidate(&self, key: &str, full_expire: bool);

    fn remove(&self, key: &str);

    fn clear(&self);
}

/// Callback-based cache. Mutations are fire-and-forget.
pub trait AsyncCache: Send + Sync {
    fn initialize(&self, completion: Completion<()>) {
        completion.complete(());
    }

    fn get(&self, key: &str, completion: Completion<Option<CacheEntry>>);

    fn put(&self, key: &str, entry: CacheEntry);

    fn invalidate(&self, key: &str, full_expire: bool);

    fn remove(&self, key: &str);

    fn clear(&self);
}

impl<C: AsyncCache + ?Sized> AsyncCache for Arc<C> {
    fn initialize(&self, completion: Completion<()>) {
        (**self).initialize(completion);
    }

    fn get(&self, key: &str, completion: Completion<Option<CacheEntry>>) {
        (**self).get(key, completion);
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        (**self).put(key, entry);
    }

    fn invalidate(&self, key: &str, full_expire: bool) {
        (**self).invalidate(key, full_expire);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// Blocking view of an [`AsyncCache`].
///
/// Lookups that are never answered, or not answered within the adapter's
/// timeout, read as a miss.
#[derive(Debug)]
pub struct SyncCache<C> {
    inner: C,
    adapter: BlockingAdapter,
}

impl<C: AsyncCache> SyncCache<C> {
    pub fn new(inner: C, adapter: BlockingAdapter) -> Self {
        Self { inner, adapter }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: AsyncCache> Cache for SyncCache<C> {
    fn initialize(&self) {
        let _ = self
            .adapter
            .call_blocking(|completion| self.inner.initialize(completion));
    }

    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.adapter
            .call_blocking(|completion| self.inner.get(key, completion))
            .flatten()
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        self.inner.put(key, entry);
    }

    fn invalidate(&self, key: &str, full_expire: bool) {
        self.inner.invalidate(key, full_expire);
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    fn clear(&self) {
        self.inner.clear();
    }
}
