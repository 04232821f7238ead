use std::sync::{Arc, RwLock};

use atomdb_cache::{ChunkCache, LruChunkCache, NoopChunkCache, TtlChunkCache};
use atomdb_codec::{BinaryCodec, Codec, TextualCodec};
use atomdb_store::{ChunkStore, FsChunkStore, MemoryChunkStore};
use atomdb_types::{ChunkHash, Value};
use atomdb_dag::{persist, ChunkContext, ValueView};
use tracing::debug;

use crate::config::{CacheConfig, CellConfig, CodecConfig, StoreConfig};
use crate::error::{CellError, CellResult};

/// A compare-and-swap reference to an immutable persisted value.
///
/// The cell holds one mutable slot — the current root hash — over a shared
/// append-only chunk store. Every mutation persists a complete new value
/// tree first and then swaps the slot, so readers always dereference a
/// fully written root, and superseded roots remain valid forever.
///
/// Successful `reset`/`swap`/`compare_and_set` calls on one cell form a
/// total order; each transition corresponds to exactly one persisted root
/// node and is visible to subsequent [`deref`](Self::deref) calls on any
/// thread.
pub struct AtomCell {
    ctx: ChunkContext,
    root: RwLock<Option<ChunkHash>>,
}

impl AtomCell {
    /// Open a cell per the config, persisting `config.init` (when present)
    /// as the initial root.
    pub fn open(config: CellConfig) -> CellResult<Self> {
        let init = config.init.clone();
        let ctx = build_context(&config)?;
        let root = match &init {
            Some(value) => Some(persist(&ctx, value)?),
            None => None,
        };
        if let Some(hash) = &root {
            debug!(root = %hash.short_hex(), "cell opened with initial value");
        }
        Ok(Self {
            ctx,
            root: RwLock::new(root),
        })
    }

    /// Open a cell that adopts an existing root hash — the reopen path for
    /// a filesystem store. `config.init` is ignored; the hash must resolve
    /// in the configured store.
    pub fn open_at(config: CellConfig, root: ChunkHash) -> CellResult<Self> {
        let ctx = build_context(&config)?;
        if !ctx.store().contains(&root)? {
            return Err(CellError::RootUnresolved(root));
        }
        debug!(root = %root.short_hex(), "cell reopened at existing root");
        Ok(Self {
            ctx,
            root: RwLock::new(Some(root)),
        })
    }

    /// The current value as a lazy view, or `None` for an empty cell.
    ///
    /// A root whose chunk has gone missing surfaces the error here without
    /// poisoning the cell.
    pub fn deref(&self) -> CellResult<Option<ValueView>> {
        let root = *self.root.read().expect("lock poisoned");
        match root {
            None => Ok(None),
            Some(hash) => Ok(Some(ValueView::from_hash(&self.ctx, &hash)?)),
        }
    }

    /// Persist `value` and make it the new root unconditionally. Returns
    /// the new root view.
    pub fn reset(&self, value: Value) -> CellResult<ValueView> {
        let hash = persist(&self.ctx, &value)?;
        *self.root.write().expect("lock poisoned") = Some(hash);
        debug!(root = %hash.short_hex(), "root reset");
        Ok(ValueView::from_hash(&self.ctx, &hash)?)
    }

    /// Apply a pure function to the current value and install the result.
    ///
    /// Runs a CAS retry loop: snapshot the root, compute, persist, and
    /// install only if the root is still the snapshot; otherwise recompute
    /// against the new root. `f` MUST be effectively pure — under
    /// contention it is invoked more than once. Returns the new root view.
    pub fn swap<F>(&self, f: F) -> CellResult<ValueView>
    where
        F: Fn(Option<ValueView>) -> Value,
    {
        loop {
            let snapshot = *self.root.read().expect("lock poisoned");
            let current = match snapshot {
                Some(hash) => Some(ValueView::from_hash(&self.ctx, &hash)?),
                None => None,
            };
            let next = f(current);
            let hash = persist(&self.ctx, &next)?;

            let mut root = self.root.write().expect("lock poisoned");
            if *root == snapshot {
                *root = Some(hash);
                drop(root);
                debug!(root = %hash.short_hex(), "root swapped");
                return Ok(ValueView::from_hash(&self.ctx, &hash)?);
            }
            // Lost the race; retry against the new root.
        }
    }

    /// Install `next` only if the current value equals `expected` by value
    /// semantics. Returns whether the swap happened; a mismatch is a
    /// `false`, not an error, and persists nothing.
    pub fn compare_and_set(&self, expected: Option<&Value>, next: Value) -> CellResult<bool> {
        loop {
            let snapshot = *self.root.read().expect("lock poisoned");
            let matches = match (&snapshot, expected) {
                (None, None) => true,
                (Some(hash), Some(want)) => {
                    ValueView::from_hash(&self.ctx, hash)?.eq_plain(want)?
                }
                _ => false,
            };
            if !matches {
                return Ok(false);
            }

            let hash = persist(&self.ctx, &next)?;
            let mut root = self.root.write().expect("lock poisoned");
            if *root == snapshot {
                *root = Some(hash);
                drop(root);
                debug!(root = %hash.short_hex(), "root compare-and-set");
                return Ok(true);
            }
            // The root moved between compare and set; re-evaluate.
        }
    }

    /// The current root hash, or `None` for an empty cell.
    pub fn root_hash(&self) -> Option<ChunkHash> {
        *self.root.read().expect("lock poisoned")
    }

    /// The shared chunk store handle.
    pub fn store(&self) -> Arc<dyn ChunkStore> {
        self.ctx.store().clone()
    }

    /// The shared chunk cache handle.
    pub fn cache(&self) -> Arc<dyn ChunkCache> {
        self.ctx.cache().clone()
    }

    /// The codec defining this store's hash space.
    pub fn codec(&self) -> Arc<dyn Codec> {
        self.ctx.codec().clone()
    }

    /// The underlying context, for running DAG operations directly.
    pub fn context(&self) -> &ChunkContext {
        &self.ctx
    }
}

impl std::fmt::Debug for AtomCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomCell")
            .field("root", &self.root_hash())
            .finish()
    }
}

fn build_context(config: &CellConfig) -> CellResult<ChunkContext> {
    let store: Arc<dyn ChunkStore> = match &config.store {
        StoreConfig::Memory => Arc::new(MemoryChunkStore::new()),
        StoreConfig::Filesystem(path) => Arc::new(FsChunkStore::open(path.clone())?),
    };
    let cache: Arc<dyn ChunkCache> = match &config.cache {
        CacheConfig::Lru(capacity) => Arc::new(LruChunkCache::new(*capacity)),
        CacheConfig::Ttl(ttl) => Arc::new(TtlChunkCache::new(*ttl)),
        CacheConfig::None => Arc::new(NoopChunkCache),
    };
    let codec: Arc<dyn Codec> = match config.codec {
        CodecConfig::Textual => Arc::new(TextualCodec),
        CodecConfig::Binary => Arc::new(BinaryCodec),
    };
    Ok(ChunkContext::new(store, cache, codec))
}
