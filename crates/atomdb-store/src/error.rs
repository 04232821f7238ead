use atomdb_types::ChunkHash;
use thiserror::Error;

/// Errors from chunk store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure in the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes no longer hash to their key (on-disk corruption).
    #[error("hash mismatch for {expected}: stored bytes hash to {computed}")]
    HashMismatch {
        expected: ChunkHash,
        computed: ChunkHash,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
