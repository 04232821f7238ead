use atomdb_codec::CodecError;
use atomdb_store::StoreError;
use atomdb_types::ChunkHash;
use thiserror::Error;

/// Errors from DAG persistence, loading, and view access.
#[derive(Debug, Error)]
pub enum DagError {
    /// A referenced child hash is unknown to the backend.
    #[error("missing chunk: {0}")]
    ChunkMissing(ChunkHash),

    /// Vector or list access past the end.
    #[error("index {index} out of range for count {count}")]
    IndexOutOfRange { index: usize, count: usize },

    /// A persist failed somewhere inside the value tree; `path` names the
    /// offending position (e.g. `users.1.name`).
    #[error("persist failed at {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: Box<DagError>,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for DAG operations.
pub type DagResult<T> = Result<T, DagError>;
