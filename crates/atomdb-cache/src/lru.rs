use std::num::NonZeroUsize;
use std::sync::Mutex;

use atomdb_types::ChunkHash;

use crate::traits::ChunkCache;

/// Fixed-capacity cache with least-recently-used eviction.
///
/// `put` makes the entry most-recently-used and evicts the LRU entry when
/// over capacity; `get` promotes the hit. Recency bookkeeping is serialized
/// behind a mutex.
pub struct LruChunkCache {
    entries: Mutex<lru::LruCache<ChunkHash, Vec<u8>>>,
}

impl LruChunkCache {
    /// Create a cache holding at most `capacity` chunks (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least one");
        Self {
            entries: Mutex::new(lru::LruCache::new(capacity)),
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("lock poisoned").is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.entries.lock().expect("lock poisoned").cap().get()
    }
}

impl ChunkCache for LruChunkCache {
    fn get(&self, hash: &ChunkHash) -> Option<Vec<u8>> {
        self.entries.lock().expect("lock poisoned").get(hash).cloned()
    }

    fn put(&self, hash: &ChunkHash, bytes: Vec<u8>) {
        self.entries.lock().expect("lock poisoned").put(*hash, bytes);
    }
}

impl std::fmt::Debug for LruChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruChunkCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(label: &[u8]) -> ChunkHash {
        ChunkHash::of_bytes(label)
    }

    #[test]
    fn hit_after_put() {
        let cache = LruChunkCache::new(4);
        cache.put(&h(b"a"), b"bytes-a".to_vec());
        assert_eq!(cache.get(&h(b"a")).as_deref(), Some(b"bytes-a".as_slice()));
    }

    #[test]
    fn miss_when_absent() {
        let cache = LruChunkCache::new(4);
        assert!(cache.get(&h(b"nothing")).is_none());
    }

    #[test]
    fn never_exceeds_capacity() {
        let cache = LruChunkCache::new(3);
        for i in 0..10u8 {
            cache.put(&h(&[i]), vec![i]);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = LruChunkCache::new(2);
        cache.put(&h(b"a"), b"a".to_vec());
        cache.put(&h(b"b"), b"b".to_vec());
        // Third insert evicts "a", the least recently used.
        cache.put(&h(b"c"), b"c".to_vec());
        assert!(cache.get(&h(b"a")).is_none());
        assert!(cache.get(&h(b"b")).is_some());
        assert!(cache.get(&h(b"c")).is_some());
    }

    #[test]
    fn get_promotes_entry() {
        // Access pattern a, b, a, c over capacity 2: the promotion of "a"
        // makes "b" the eviction victim.
        let cache = LruChunkCache::new(2);
        cache.put(&h(b"a"), b"a".to_vec());
        cache.put(&h(b"b"), b"b".to_vec());
        assert!(cache.get(&h(b"a")).is_some());
        cache.put(&h(b"c"), b"c".to_vec());

        assert!(cache.get(&h(b"b")).is_none());
        assert!(cache.get(&h(b"a")).is_some());
        assert!(cache.get(&h(b"c")).is_some());
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let cache = LruChunkCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(&h(b"only"), b"x".to_vec());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_use_is_safe() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(LruChunkCache::new(8));
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..50u8 {
                        cache.put(&h(&[i, j]), vec![i, j]);
                        cache.get(&h(&[i, j]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread should not panic");
        }
        assert!(cache.len() <= 8);
    }
}
