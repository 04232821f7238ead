//! Chunk caches for AtomDB.
//!
//! A [`ChunkCache`] sits between readers and a chunk backend, holding
//! recently seen encoded chunks. Because chunks are immutable, a cache hit
//! never needs re-validation, and the cache is purely advisory: every
//! variant here can be swapped for [`NoopChunkCache`] without changing any
//! observable result, only the backend read count.
//!
//! - [`LruChunkCache`] — fixed capacity, least-recently-used eviction
//! - [`TtlChunkCache`] — unbounded, entries expire after a fixed lifetime
//! - [`NoopChunkCache`] — the explicit "no cache" choice

pub mod lru;
pub mod noop;
pub mod traits;
pub mod ttl;

pub use lru::LruChunkCache;
pub use noop::NoopChunkCache;
pub use traits::ChunkCache;
pub use ttl::TtlChunkCache;
