use atomdb_types::ChunkHash;

use crate::traits::ChunkCache;

/// Cache that caches nothing: every `get` misses, every `put` is dropped.
///
/// Useful as the explicit "no cache" configuration and as the baseline in
/// tests that count backend reads.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopChunkCache;

impl ChunkCache for NoopChunkCache {
    fn get(&self, _hash: &ChunkHash) -> Option<Vec<u8>> {
        None
    }

    fn put(&self, _hash: &ChunkHash, _bytes: Vec<u8>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_misses() {
        let cache = NoopChunkCache;
        let hash = ChunkHash::of_bytes(b"x");
        cache.put(&hash, b"x".to_vec());
        assert!(cache.get(&hash).is_none());
    }
}
