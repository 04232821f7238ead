//! Read protocols shared by lazy views and plain values.
//!
//! Consumers generic over these traits work unchanged against an in-memory
//! [`Value`] or a view backed by a chunk store. The trait methods return
//! materialized values; callers that want to stay lazy use the concrete
//! view APIs directly.

use atomdb_types::Value;

use crate::error::{DagError, DagResult};
use crate::views::{ListView, MapView, SetView, ValueView, VectorView};

/// Anything that knows how many elements it holds without visiting them.
/// Non-collections count zero.
pub trait Counted {
    fn count(&self) -> usize;
}

/// Key-based access. Non-map receivers hold no keys.
pub trait Keyed {
    fn has_key(&self, key: &Value) -> bool;
    fn lookup(&self, key: &Value) -> DagResult<Option<Value>>;
}

/// Position-based access.
pub trait Indexed {
    fn nth_value(&self, index: usize) -> DagResult<Value>;
}

impl Counted for Value {
    fn count(&self) -> usize {
        match self {
            Value::Map(m) => m.len(),
            Value::Vector(xs) => xs.len(),
            Value::List(xs) => xs.len(),
            Value::Set(xs) => xs.len(),
            _ => 0,
        }
    }
}

impl Keyed for Value {
    fn has_key(&self, key: &Value) -> bool {
        match self {
            Value::Map(m) => m.contains_key(key),
            _ => false,
        }
    }

    fn lookup(&self, key: &Value) -> DagResult<Option<Value>> {
        match self {
            Value::Map(m) => Ok(m.get(key).cloned()),
            _ => Ok(None),
        }
    }
}

impl Indexed for Value {
    fn nth_value(&self, index: usize) -> DagResult<Value> {
        let found = match self {
            Value::Vector(xs) => xs.get(index).cloned(),
            Value::List(xs) => xs.get(index).cloned(),
            _ => None,
        };
        found.ok_or(DagError::IndexOutOfRange {
            index,
            count: self.count(),
        })
    }
}

impl Counted for MapView {
    fn count(&self) -> usize {
        MapView::count(self)
    }
}

impl Counted for VectorView {
    fn count(&self) -> usize {
        VectorView::count(self)
    }
}

impl Counted for ListView {
    fn count(&self) -> usize {
        ListView::count(self)
    }
}

impl Counted for SetView {
    fn count(&self) -> usize {
        SetView::count(self)
    }
}

impl Counted for ValueView {
    fn count(&self) -> usize {
        match self {
            ValueView::Scalar { .. } => 0,
            ValueView::Map(v) => v.count(),
            ValueView::Vector(v) => v.count(),
            ValueView::List(v) => v.count(),
            ValueView::Set(v) => v.count(),
        }
    }
}

impl Keyed for MapView {
    fn has_key(&self, key: &Value) -> bool {
        self.contains_key(key)
    }

    fn lookup(&self, key: &Value) -> DagResult<Option<Value>> {
        match self.get(key)? {
            Some(view) => Ok(Some(view.to_plain()?)),
            None => Ok(None),
        }
    }
}

impl Indexed for VectorView {
    fn nth_value(&self, index: usize) -> DagResult<Value> {
        self.nth(index)?.to_plain()
    }
}

impl Indexed for ListView {
    fn nth_value(&self, index: usize) -> DagResult<Value> {
        self.nth(index)?.to_plain()
    }
}
