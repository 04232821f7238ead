use atomdb_dag::DagError;
use atomdb_store::StoreError;
use atomdb_types::ChunkHash;
use thiserror::Error;

/// Errors from root cell operations.
#[derive(Debug, Error)]
pub enum CellError {
    /// An adopted root hash does not resolve in the configured store.
    #[error("root hash {0} does not resolve in the store")]
    RootUnresolved(ChunkHash),

    #[error(transparent)]
    Dag(#[from] DagError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for cell operations.
pub type CellResult<T> = Result<T, CellError>;
