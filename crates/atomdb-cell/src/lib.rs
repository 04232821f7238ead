//! The AtomDB root cell.
//!
//! An [`AtomCell`] is the mutable entry point to an immutable Merkle DAG: a
//! single CAS-updated slot holding the current root hash over a shared
//! content-addressed chunk store. Reads hand back lazy views that load
//! chunks on demand; writes persist a complete new value and swap the slot.
//!
//! ```no_run
//! use atomdb_cell::{AtomCell, CellConfig};
//! use atomdb_types::Value;
//!
//! # fn main() -> Result<(), atomdb_cell::CellError> {
//! let cell = AtomCell::open(CellConfig::memory().with_init(Value::map([(
//!     Value::from("count"),
//!     Value::Int(0),
//! )])))?;
//!
//! cell.swap(|current| {
//!     let view = current.expect("cell was opened with a value");
//!     let map = view.as_map().expect("root is a map");
//!     let count = map.get(&Value::from("count")).unwrap().expect("count key");
//!     match count.as_scalar() {
//!         Some(Value::Int(n)) => Value::map([(Value::from("count"), Value::Int(n + 1))]),
//!         _ => unreachable!(),
//!     }
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod cell;
pub mod config;
pub mod error;

pub use cell::AtomCell;
pub use config::{CacheConfig, CellConfig, CodecConfig, StoreConfig};
pub use error::{CellError, CellResult};
