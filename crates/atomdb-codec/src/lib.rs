//! Chunk record codecs for AtomDB.
//!
//! A [`Codec`] turns a [`ChunkRecord`] into bytes and back. Chunk identity
//! is the SHA-256 of the codec's output, so codecs must be deterministic:
//! the same record must produce the same bytes on every call, on every
//! host. Both codecs here get determinism from the record shape itself
//! (ordered children, fixed field order, UTC timestamps) rather than from
//! any post-processing.
//!
//! - [`TextualCodec`] — self-describing canonical JSON; readable with any
//!   standard tool.
//! - [`BinaryCodec`] — length-prefixed, tagged bincode frames; smaller and
//!   faster, semantically equivalent.
//!
//! Stores using different codecs are not byte-compatible: the same value
//! hashes differently under each codec.

pub mod binary;
pub mod error;
pub mod textual;

use atomdb_types::ChunkRecord;

pub use binary::BinaryCodec;
pub use error::{CodecError, CodecResult};
pub use textual::TextualCodec;

/// Deterministic (de)serializer between a [`ChunkRecord`] and bytes.
pub trait Codec: Send + Sync {
    /// Short codec name for diagnostics.
    fn name(&self) -> &'static str;

    /// Serialize a record to its canonical byte form.
    fn encode(&self, record: &ChunkRecord) -> CodecResult<Vec<u8>>;

    /// Reconstruct a record from bytes produced by `encode`.
    fn decode(&self, bytes: &[u8]) -> CodecResult<ChunkRecord>;
}
