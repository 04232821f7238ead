use atomdb_types::ChunkHash;

/// Advisory cache of encoded chunk bytes, keyed by chunk hash.
///
/// A miss falls through to the backend; a hit may be served without
/// re-validation because chunks are immutable. Correctness never depends on
/// the cache: dropping every entry at any moment is always safe.
pub trait ChunkCache: Send + Sync {
    /// Look up cached bytes for a hash.
    fn get(&self, hash: &ChunkHash) -> Option<Vec<u8>>;

    /// Offer bytes to the cache. The cache may drop them immediately.
    fn put(&self, hash: &ChunkHash, bytes: Vec<u8>);
}
