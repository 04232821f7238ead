//! Merkle DAG engine for AtomDB.
//!
//! Composite values decompose into content-addressed chunks: scalars become
//! leaf chunks, collections become node chunks whose payload is child
//! hashes. Equal subtrees therefore share storage, and a root hash pins an
//! entire immutable value.
//!
//! The three ways through this crate:
//!
//! - [`persist`] — value in, root hash out (children first, bottom up)
//! - [`load`] — root hash in, fully materialized value out (the strict
//!   semantic reference)
//! - [`ValueView::from_hash`] — root hash in, lazy view out; chunks load
//!   only along the paths actually traversed
//!
//! All three run against a [`ChunkContext`], the shared bundle of chunk
//! store, advisory cache, and codec.

pub mod context;
pub mod error;
pub mod load;
pub mod persist;
pub mod protocols;
pub mod views;

pub use context::ChunkContext;
pub use error::{DagError, DagResult};
pub use load::{load, load_record};
pub use persist::{persist, persist_hash};
pub use protocols::{Counted, Indexed, Keyed};
pub use views::{ListView, MapView, SetView, ValueView, VectorView};
