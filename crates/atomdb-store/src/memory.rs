use std::collections::HashMap;
use std::sync::RwLock;

use atomdb_types::ChunkHash;

use crate::error::StoreResult;
use crate::traits::ChunkStore;

/// In-memory, `HashMap`-based chunk store.
///
/// Intended for tests and embedding. All chunks are held in memory behind a
/// `RwLock` for safe concurrent access.
pub struct MemoryChunkStore {
    chunks: RwLock<HashMap<ChunkHash, Vec<u8>>>,
}

impl MemoryChunkStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of chunks currently stored.
    pub fn len(&self) -> usize {
        self.chunks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored chunks.
    pub fn total_bytes(&self) -> u64 {
        self.chunks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove all chunks.
    pub fn clear(&self) {
        self.chunks.write().expect("lock poisoned").clear();
    }
}

impl Default for MemoryChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<ChunkHash> {
        let hash = ChunkHash::of_bytes(bytes);
        let mut chunks = self.chunks.write().expect("lock poisoned");
        // Idempotent: same hash always maps to the same bytes, so an
        // existing entry is left untouched.
        chunks.entry(hash).or_insert_with(|| bytes.to_vec());
        Ok(hash)
    }

    fn get(&self, hash: &ChunkHash) -> StoreResult<Option<Vec<u8>>> {
        let chunks = self.chunks.read().expect("lock poisoned");
        Ok(chunks.get(hash).cloned())
    }

    fn contains(&self, hash: &ChunkHash) -> StoreResult<bool> {
        let chunks = self.chunks.read().expect("lock poisoned");
        Ok(chunks.contains_key(hash))
    }
}

impl std::fmt::Debug for MemoryChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryChunkStore")
            .field("chunk_count", &self.len())
            .finish()
    }
}
