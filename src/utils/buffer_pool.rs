//! Reusable byte buffers.
//!
//! Returned buffers are kept ordered both by size and by last use. A request
//! is served by the smallest retained buffer that is large enough; once the
//! retained bytes exceed the pool's limit the least recently used buffers are
//! dropped. All state sits behind one mutex, so the pool can be shared across
//! concurrent requests.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

#[derive(Debug, Default)]
struct PoolState {
    /// `(len, seq)` -> buffer, for size lookups
    by_size: BTreeMap<(usize, u64), Vec<u8>>,
    /// `seq` -> len, oldest first
    by_last_use: BTreeMap<u64, usize>,
    current_size: usize,
    next_seq: u64,
    outstanding: usize,
}

/// A size-bounded pool of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    size_limit: usize,
    state: Mutex<PoolState>,
}

impl BufferPool {
    /// Create a pool that retains at most `size_limit` bytes.
    pub fn new(size_limit: usize) -> Self {
        Self {
            size_limit,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub const fn size_limit(&self) -> usize {
        self.size_limit
    }

    /// Take a buffer of at least `len` bytes. The contents are unspecified.
    ///
    /// Every buffer taken here must be handed back through
    /// [`return_buf`](Self::return_buf); [`borrow`](Self::borrow) does that
    /// automatically.
    pub fn get_buf(&self, len: usize) -> Vec<u8> {
        let mut state = self.lock();
        state.outstanding += 1;
        let key = state.by_size.range((len, 0)..).next().map(|(k, _)| *k);
        if let Some(key) = key
            && let Some(buf) = state.by_size.remove(&key)
        {
            state.by_last_use.remove(&key.1);
            state.current_size -= buf.len();
            return buf;
        }
        vec![0; len]
    }

    /// Hand a buffer back. Buffers larger than the limit are dropped.
    pub fn return_buf(&self, buf: Vec<u8>) {
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        let len = buf.len();
        if len == 0 || len > self.size_limit {
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.by_size.insert((len, seq), buf);
        state.by_last_use.insert(seq, len);
        state.current_size += len;
        self.trim(&mut state);
    }

    /// Take a buffer that returns itself to the pool when dropped.
    pub fn borrow(&self, len: usize) -> PooledBuffer<'_> {
        PooledBuffer {
            pool: self,
            buf: Some(self.get_buf(len)),
        }
    }

    /// Buffers handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Bytes currently retained.
    pub fn retained_bytes(&self) -> usize {
        self.lock().current_size
    }

    fn trim(&self, state: &mut PoolState) {
        while state.current_size > self.size_limit {
            let Some((seq, len)) = state.by_last_use.pop_first() else {
                break;
            };
            state.by_size.remove(&(len, seq));
            state.current_size -= len;
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(crate::defaults::network::POOL_SIZE_LIMIT)
    }
}

/// A buffer on loan from a [`BufferPool`].
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Option<Vec<u8>>,
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or_default()
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.return_buf(buf);
        }
    }
}

/// Growable byte sink backed by pooled buffers.
///
/// Growing swaps in a larger pooled buffer and returns the old one.
#[derive(Debug)]
pub struct PooledWriter<'a> {
    pool: &'a BufferPool,
    buf: PooledBuffer<'a>,
    count: usize,
}

impl<'a> PooledWriter<'a> {
    pub fn new(pool: &'a BufferPool, size_hint: usize) -> Self {
        let initial = size_hint.max(crate::defaults::body::MIN_ACCUMULATOR);
        Self {
            pool,
            buf: pool.borrow(initial),
            count: 0,
        }
    }

    pub fn write(&mut self, data: &[u8]) {
        self.expand(data.len());
        self.buf[self.count..self.count + data.len()].copy_from_slice(data);
        self.count += data.len();
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy the written bytes out. The backing buffer goes back to the pool.
    pub fn into_bytes(self) -> Bytes {
        Bytes::copy_from_slice(&self.buf[..self.count])
    }

    fn expand(&mut self, additional: usize) {
        let needed = self.count + additional;
        if needed <= self.buf.len() {
            return;
        }
        let mut grown = self.pool.borrow(needed * 2);
        grown[..self.count].copy_from_slice(&self.buf[..self.count]);
        // old buffer is returned when it drops here
        self.buf = grown;
    }
}
