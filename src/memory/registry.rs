//! Per-thread buffer registry.
//!
//! Maps an opaque thread identifier to its own capacity-bounded [`ThreadMemory`].
//! Buffers are created lazily on first use. Each one sits behind an async
//! reader-writer lock so appends are exclusive while snapshots can share.
//! At most `max_threads` buffers are held; the least recently used one is dropped
//! to make room for a new thread.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tokio::sync::RwLock;

use super::thread::ThreadMemory;

/// Thread key used when a caller does not name one.
pub const DEFAULT_THREAD: &str = "default";

/// Default number of thread buffers kept in memory.
pub const DEFAULT_MAX_THREADS: usize = 1024;

pub type SharedThread = Arc<RwLock<ThreadMemory>>;

pub struct ThreadRegistry {
    threads: Mutex<LruCache<String, SharedThread>>,
    capacity: usize,
}

impl ThreadRegistry {
    /// `capacity` bounds each buffer; `max_threads` bounds the number of buffers
    /// (0 is treated as 1).
    pub fn new(capacity: usize, max_threads: usize) -> Self {
        let max_threads = NonZeroUsize::new(max_threads).unwrap_or(NonZeroUsize::MIN);
        Self {
            threads: Mutex::new(LruCache::new(max_threads)),
            capacity,
        }
    }

    /// Get the buffer for `thread_id`, creating an empty one if needed.
    pub fn thread(&self, thread_id: &str) -> SharedThread {
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(thread) = threads.get(thread_id) {
            return Arc::clone(thread);
        }

        tracing::debug!(thread_id, capacity = self.capacity, "creating thread buffer");
        let thread = Arc::new(RwLock::new(ThreadMemory::new(self.capacity)));
        if let Some((evicted, _)) = threads.push(thread_id.to_string(), Arc::clone(&thread)) {
            tracing::debug!(evicted = %evicted, "evicted least recently used thread buffer");
        }
        thread
    }

    /// Get the buffer for `thread_id` without creating it.
    pub fn existing(&self, thread_id: &str) -> Option<SharedThread> {
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        threads.get(thread_id).cloned()
    }

    /// Drop the buffer for `thread_id`, returning it if it was held.
    pub fn remove(&self, thread_id: &str) -> Option<SharedThread> {
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        threads.pop(thread_id)
    }

    /// Number of thread buffers currently held.
    pub fn len(&self) -> usize {
        self.threads.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
