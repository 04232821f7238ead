//! Lazy, read-only views over node chunks.
//!
//! A view answers structural questions (count, containment, bounds) from
//! its child table alone and loads child chunks only when an element is
//! actually accessed. Loaded children land in a per-view memo so repeated
//! access is free; the shared [`ChunkCache`](atomdb_cache::ChunkCache)
//! avoids redundant backend reads across views.
//!
//! Views are read-only — there are no mutating methods, so in-place change
//! is unrepresentable. "Updates" ([`MapView::assoc`], [`SetView::conj`],
//! ...) persist a new node and hand back a new view; the original is
//! untouched.
//!
//! The per-view memo uses `Rc<RefCell<..>>`, which deliberately makes views
//! `!Send`: local memoization is a single-thread affair. Hand a root hash
//! (not a view) to another thread and re-wrap it there.

mod list;
mod map;
mod set;
mod vector;

pub use list::ListView;
pub use map::MapView;
pub use set::SetView;
pub use vector::VectorView;

use atomdb_types::{ChunkHash, ChunkRecord, Value};

use crate::context::ChunkContext;
use crate::error::DagResult;
use crate::load::scalar_value;

/// What dereferencing a chunk produces: a fully materialized scalar, or a
/// lazy view for each collection kind.
#[derive(Clone, Debug)]
pub enum ValueView {
    Scalar { hash: ChunkHash, value: Value },
    Map(MapView),
    Vector(VectorView),
    List(ListView),
    Set(SetView),
}

impl ValueView {
    /// Load the chunk stored under `hash` and wrap it.
    pub fn from_hash(ctx: &ChunkContext, hash: &ChunkHash) -> DagResult<Self> {
        let record = ctx.require_record(hash)?;
        Self::wrap(ctx, *hash, record)
    }

    pub(crate) fn wrap(ctx: &ChunkContext, hash: ChunkHash, record: ChunkRecord) -> DagResult<Self> {
        Ok(match record {
            ChunkRecord::Map { children } => {
                ValueView::Map(MapView::new(ctx.clone(), hash, children))
            }
            ChunkRecord::Vector { children } => {
                ValueView::Vector(VectorView::new(ctx.clone(), hash, children))
            }
            ChunkRecord::List { children } => {
                ValueView::List(ListView::new(ctx.clone(), hash, children))
            }
            ChunkRecord::Set { children } => {
                ValueView::Set(SetView::new(ctx.clone(), hash, children))
            }
            scalar => ValueView::Scalar {
                hash,
                value: scalar_value(&scalar)?,
            },
        })
    }

    /// The hash of the underlying chunk — equal, by construction, to the
    /// hash the fully materialized counterpart would persist to.
    pub fn content_hash(&self) -> &ChunkHash {
        match self {
            ValueView::Scalar { hash, .. } => hash,
            ValueView::Map(v) => v.content_hash(),
            ValueView::Vector(v) => v.content_hash(),
            ValueView::List(v) => v.content_hash(),
            ValueView::Set(v) => v.content_hash(),
        }
    }

    /// Kind name of the denoted value.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueView::Scalar { value, .. } => value.kind_name(),
            ValueView::Map(_) => "map",
            ValueView::Vector(_) => "vector",
            ValueView::List(_) => "list",
            ValueView::Set(_) => "set",
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ValueView::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapView> {
        match self {
            ValueView::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorView> {
        match self {
            ValueView::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListView> {
        match self {
            ValueView::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetView> {
        match self {
            ValueView::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Materialize the full in-memory value, detaching from the store.
    pub fn to_plain(&self) -> DagResult<Value> {
        match self {
            ValueView::Scalar { value, .. } => Ok(value.clone()),
            ValueView::Map(v) => v.to_plain(),
            ValueView::Vector(v) => v.to_plain(),
            ValueView::List(v) => v.to_plain(),
            ValueView::Set(v) => v.to_plain(),
        }
    }

    /// Value equality against an in-memory value. Fallible because it may
    /// load chunks.
    pub fn eq_plain(&self, other: &Value) -> DagResult<bool> {
        let counts_match = match (self, other) {
            (ValueView::Scalar { value, .. }, _) => return Ok(value == other),
            (ValueView::Map(v), Value::Map(m)) => v.count() == m.len(),
            (ValueView::Vector(v), Value::Vector(xs)) => v.count() == xs.len(),
            (ValueView::List(v), Value::List(xs)) => v.count() == xs.len(),
            (ValueView::Set(v), Value::Set(xs)) => v.count() == xs.len(),
            _ => return Ok(false),
        };
        if !counts_match {
            return Ok(false);
        }
        Ok(self.to_plain()? == *other)
    }

    /// Value equality against another view. Short-circuits on equal chunk
    /// hashes when both sides share a store.
    pub fn eq_view(&self, other: &ValueView) -> DagResult<bool> {
        match (self, other) {
            (ValueView::Scalar { value: a, .. }, ValueView::Scalar { value: b, .. }) => {
                Ok(a == b)
            }
            (ValueView::Scalar { .. }, _) | (_, ValueView::Scalar { .. }) => Ok(false),
            _ => {
                if let (Some(a), Some(b)) = (self.context(), other.context()) {
                    if a.same_store(b) && self.content_hash() == other.content_hash() {
                        return Ok(true);
                    }
                }
                Ok(self.to_plain()? == other.to_plain()?)
            }
        }
    }

    fn context(&self) -> Option<&ChunkContext> {
        match self {
            ValueView::Scalar { .. } => None,
            ValueView::Map(v) => Some(v.context()),
            ValueView::Vector(v) => Some(v.context()),
            ValueView::List(v) => Some(v.context()),
            ValueView::Set(v) => Some(v.context()),
        }
    }
}
