use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use atomdb_types::ChunkHash;
use tracing::debug;

use crate::traits::ChunkCache;

/// Time-bounded cache: entries older than the configured lifetime are
/// treated as misses and dropped lazily.
///
/// There is no capacity bound beyond expiry. Reads take the read lock;
/// an expired hit upgrades to the write lock to drop the stale entry.
pub struct TtlChunkCache {
    ttl: Duration,
    entries: RwLock<HashMap<ChunkHash, (Instant, Vec<u8>)>>,
}

impl TtlChunkCache {
    /// Create a cache whose entries live for `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The configured entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Drop every expired entry now. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|_, (inserted, _)| inserted.elapsed() <= self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "expired cache entries purged");
        }
        removed
    }
}

impl ChunkCache for TtlChunkCache {
    fn get(&self, hash: &ChunkHash) -> Option<Vec<u8>> {
        {
            let entries = self.entries.read().expect("lock poisoned");
            match entries.get(hash) {
                Some((inserted, bytes)) if inserted.elapsed() <= self.ttl => {
                    return Some(bytes.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry was present but stale; drop it under the write lock. A
        // concurrent re-insert may have refreshed it in between, so
        // re-check the timestamp before removing.
        let mut entries = self.entries.write().expect("lock poisoned");
        if let Some((inserted, _)) = entries.get(hash) {
            if inserted.elapsed() > self.ttl {
                entries.remove(hash);
            }
        }
        None
    }

    fn put(&self, hash: &ChunkHash, bytes: Vec<u8>) {
        let mut entries = self.entries.write().expect("lock poisoned");
        entries.insert(*hash, (Instant::now(), bytes));
    }
}

impl std::fmt::Debug for TtlChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlChunkCache")
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}
