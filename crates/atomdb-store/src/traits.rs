use atomdb_types::ChunkHash;

use crate::error::StoreResult;

/// Content-addressed chunk store.
///
/// All implementations must satisfy these invariants:
/// - Chunks are immutable once written; a store never overwrites an
///   existing hash. Content-addressing guarantees the same bytes always
///   map to the same key.
/// - `put` is idempotent and always returns the computed hash, whether or
///   not the chunk was already present.
/// - `get` of an unknown hash is `Ok(None)`, never an error.
/// - Concurrent put/get is safe.
/// - All I/O errors are propagated, never silently ignored.
///
/// There is no listing and no delete: the store is append-only and chunks
/// are reclaimed only by discarding the whole store.
pub trait ChunkStore: Send + Sync {
    /// Store bytes under their content hash and return that hash.
    ///
    /// If the chunk is already present this is a no-op that still returns
    /// the hash.
    fn put(&self, bytes: &[u8]) -> StoreResult<ChunkHash>;

    /// Read the bytes stored under a hash, or `None` if unknown.
    fn get(&self, hash: &ChunkHash) -> StoreResult<Option<Vec<u8>>>;

    /// Check presence without reading the bytes.
    fn contains(&self, hash: &ChunkHash) -> StoreResult<bool>;

    /// Read several chunks in one call.
    ///
    /// Default implementation calls `get` per hash; backends may override
    /// for fewer I/O round-trips.
    fn get_batch(&self, hashes: &[ChunkHash]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        hashes.iter().map(|h| self.get(h)).collect()
    }

    /// Store several chunks in one call and return their hashes.
    fn put_batch(&self, blobs: &[Vec<u8>]) -> StoreResult<Vec<ChunkHash>> {
        blobs.iter().map(|b| self.put(b)).collect()
    }
}
