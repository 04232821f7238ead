//! Foundation types for AtomDB.
//!
//! This crate provides the identity, value, and record types used throughout
//! the AtomDB workspace. Every other AtomDB crate depends on `atomdb-types`.
//!
//! # Key Types
//!
//! - [`ChunkHash`] — content-addressed chunk identity (SHA-256 digest)
//! - [`Value`] — the closed sum type over every persistable kind
//! - [`Keyword`] — namespaced keyword scalar
//! - [`ChunkRecord`] — the tagged node shape written to chunk backends

pub mod error;
pub mod hash;
pub mod record;
pub mod value;

pub use error::TypeError;
pub use hash::ChunkHash;
pub use record::{ChunkRecord, Leaf};
pub use value::{Keyword, Value};
