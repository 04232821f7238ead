use std::sync::Arc;

use atomdb_cache::ChunkCache;
use atomdb_codec::Codec;
use atomdb_store::ChunkStore;
use atomdb_types::{ChunkHash, ChunkRecord};

use crate::error::{DagError, DagResult};

/// The handle bundle every DAG operation runs against: a chunk store, an
/// advisory byte cache in front of it, and the codec defining the byte form
/// (and therefore the hashes) of this database.
///
/// Cloning a context clones `Arc`s; every cell and view over one open
/// database shares the same three handles.
#[derive(Clone)]
pub struct ChunkContext {
    store: Arc<dyn ChunkStore>,
    cache: Arc<dyn ChunkCache>,
    codec: Arc<dyn Codec>,
}

impl ChunkContext {
    pub fn new(
        store: Arc<dyn ChunkStore>,
        cache: Arc<dyn ChunkCache>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self { store, cache, codec }
    }

    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn ChunkCache> {
        &self.cache
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Whether two contexts are backed by the same store instance.
    pub fn same_store(&self, other: &ChunkContext) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Encode a record, store it, and prime the cache. Returns the chunk
    /// hash.
    pub fn store_record(&self, record: &ChunkRecord) -> DagResult<ChunkHash> {
        let bytes = self.codec.encode(record)?;
        let hash = self.store.put(&bytes)?;
        self.cache.put(&hash, bytes);
        Ok(hash)
    }

    /// Load and decode the record stored under a hash, consulting the cache
    /// first. `Ok(None)` when the backend does not know the hash.
    pub fn load_record(&self, hash: &ChunkHash) -> DagResult<Option<ChunkRecord>> {
        if let Some(bytes) = self.cache.get(hash) {
            return Ok(Some(self.codec.decode(&bytes)?));
        }
        match self.store.get(hash)? {
            Some(bytes) => {
                let record = self.codec.decode(&bytes)?;
                self.cache.put(hash, bytes);
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Like [`load_record`](Self::load_record), but a missing chunk is an
    /// error naming the hash.
    pub fn require_record(&self, hash: &ChunkHash) -> DagResult<ChunkRecord> {
        self.load_record(hash)?
            .ok_or(DagError::ChunkMissing(*hash))
    }
}

impl std::fmt::Debug for ChunkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkContext")
            .field("codec", &self.codec.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use atomdb_cache::{LruChunkCache, NoopChunkCache};
    use atomdb_codec::TextualCodec;
    use atomdb_store::MemoryChunkStore;
    use atomdb_types::Value;

    use super::*;

    fn memory_context() -> ChunkContext {
        ChunkContext::new(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(NoopChunkCache),
            Arc::new(TextualCodec),
        )
    }

    #[test]
    fn store_then_load_roundtrip() {
        let ctx = memory_context();
        let record = ChunkRecord::Bool { value: true };
        let hash = ctx.store_record(&record).unwrap();
        assert_eq!(ctx.load_record(&hash).unwrap(), Some(record));
    }

    #[test]
    fn load_unknown_hash_is_none() {
        let ctx = memory_context();
        assert!(ctx.load_record(&ChunkHash::of_bytes(b"unknown")).unwrap().is_none());
    }

    #[test]
    fn require_unknown_hash_names_it() {
        let ctx = memory_context();
        let missing = ChunkHash::of_bytes(b"gone");
        match ctx.require_record(&missing) {
            Err(DagError::ChunkMissing(h)) => assert_eq!(h, missing),
            other => panic!("expected ChunkMissing, got {other:?}"),
        }
    }

    #[test]
    fn store_record_primes_the_cache() {
        let store = Arc::new(MemoryChunkStore::new());
        let cache = Arc::new(LruChunkCache::new(8));
        let ctx = ChunkContext::new(store.clone(), cache.clone(), Arc::new(TextualCodec));

        let hash = ctx
            .store_record(&ChunkRecord::String {
                value: "cached".into(),
            })
            .unwrap();
        // The bytes are retrievable from the cache alone.
        assert!(cache.get(&hash).is_some());
    }

    #[test]
    fn same_store_compares_by_identity() {
        let store: Arc<dyn ChunkStore> = Arc::new(MemoryChunkStore::new());
        let a = ChunkContext::new(store.clone(), Arc::new(NoopChunkCache), Arc::new(TextualCodec));
        let b = ChunkContext::new(store, Arc::new(NoopChunkCache), Arc::new(TextualCodec));
        assert!(a.same_store(&b));
        assert!(!a.same_store(&memory_context()));
    }

    #[test]
    fn contexts_with_different_codecs_have_different_hash_spaces() {
        use atomdb_codec::BinaryCodec;

        let record = ChunkRecord::Map {
            children: vec![(Value::from("k"), ChunkHash::of_bytes(b"v"))],
        };
        let textual = memory_context();
        let binary = ChunkContext::new(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(NoopChunkCache),
            Arc::new(BinaryCodec),
        );
        let h1 = textual.store_record(&record).unwrap();
        let h2 = binary.store_record(&record).unwrap();
        assert_ne!(h1, h2);
    }
}
