use std::path::PathBuf;
use std::time::Duration;

use atomdb_types::Value;

/// Which chunk backend a cell opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    /// Process-memory store; contents vanish with the cell.
    Memory,
    /// Fan-out directory store rooted at the given path.
    Filesystem(PathBuf),
}

/// Which chunk cache sits in front of the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheConfig {
    /// Fixed capacity, least-recently-used eviction.
    Lru(usize),
    /// Unbounded, entries expire after the given lifetime.
    Ttl(Duration),
    /// No caching.
    None,
}

/// Which codec defines the byte form (and the hash space) of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecConfig {
    /// Self-describing canonical JSON.
    Textual,
    /// Length-prefixed tagged binary.
    Binary,
}

/// Configuration for opening a root cell.
#[derive(Clone, Debug)]
pub struct CellConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub codec: CodecConfig,
    /// Optional initial value, persisted at open to seed the root.
    /// Ignored by [`AtomCell::open_at`](crate::AtomCell::open_at), which
    /// adopts an existing root instead.
    pub init: Option<Value>,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::Memory,
            cache: CacheConfig::None,
            codec: CodecConfig::Textual,
            init: None,
        }
    }
}

impl CellConfig {
    /// Memory-backed cell with no cache and the textual codec.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Filesystem-backed cell at `path` with the given codec.
    pub fn filesystem(path: impl Into<PathBuf>, codec: CodecConfig) -> Self {
        Self {
            store: StoreConfig::Filesystem(path.into()),
            codec,
            ..Self::default()
        }
    }

    /// Set the initial value.
    pub fn with_init(mut self, value: Value) -> Self {
        self.init = Some(value);
        self
    }

    /// Set the cache variant.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_memory_uncached_textual() {
        let config = CellConfig::default();
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.cache, CacheConfig::None);
        assert_eq!(config.codec, CodecConfig::Textual);
        assert!(config.init.is_none());
    }

    #[test]
    fn builders_compose() {
        let config = CellConfig::filesystem("/tmp/db", CodecConfig::Binary)
            .with_cache(CacheConfig::Lru(100))
            .with_init(Value::Int(0));
        assert_eq!(
            config.store,
            StoreConfig::Filesystem(PathBuf::from("/tmp/db"))
        );
        assert_eq!(config.cache, CacheConfig::Lru(100));
        assert_eq!(config.codec, CodecConfig::Binary);
        assert_eq!(config.init, Some(Value::Int(0)));
    }
}
