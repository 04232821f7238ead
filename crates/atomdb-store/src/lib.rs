//! Content-addressed chunk storage for AtomDB.
//!
//! Every persisted value decomposes into immutable chunks keyed by the
//! SHA-256 of their serialized bytes. This crate holds the byte-level
//! backends; it never interprets chunk contents.
//!
//! # Backends
//!
//! All backends implement the [`ChunkStore`] trait:
//!
//! - [`MemoryChunkStore`] — `HashMap`-based store for tests and embedding
//! - [`FsChunkStore`] — fan-out directory layout (`<root>/<h[0..2]>/<h[2..]>`)
//!   with atomic temp-file-and-rename writes
//!
//! # Design Rules
//!
//! 1. Chunks are immutable once written; a hash is never overwritten.
//! 2. `put` is idempotent and always returns the computed hash.
//! 3. `get` of an unknown hash is `Ok(None)`, never an error.
//! 4. Concurrent put/get is safe; same-hash write races are benign.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsChunkStore;
pub use memory::MemoryChunkStore;
pub use traits::ChunkStore;
