use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use atomdb_types::{ChunkHash, ChunkRecord, Value};

use crate::context::ChunkContext;
use crate::error::{DagError, DagResult};
use crate::load::load;
use crate::persist::persist;
use crate::views::ValueView;

/// Lazy view over a vector node.
///
/// The child table is the ordered child-hash sequence; bounds checks come
/// from the table, `nth` is a single chunk load, and loaded elements are
/// memoized per view.
#[derive(Clone)]
pub struct VectorView {
    ctx: ChunkContext,
    hash: ChunkHash,
    children: Arc<Vec<ChunkHash>>,
    loaded: Rc<RefCell<HashMap<usize, ValueView>>>,
}

impl VectorView {
    pub(crate) fn new(ctx: ChunkContext, hash: ChunkHash, children: Vec<ChunkHash>) -> Self {
        Self {
            ctx,
            hash,
            children: Arc::new(children),
            loaded: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub(crate) fn context(&self) -> &ChunkContext {
        &self.ctx
    }

    /// The hash of the underlying vector chunk.
    pub fn content_hash(&self) -> &ChunkHash {
        &self.hash
    }

    /// Number of elements, without loading any child.
    pub fn count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Element at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> DagResult<Option<ValueView>> {
        if index >= self.children.len() {
            return Ok(None);
        }
        self.load_child(index).map(Some)
    }

    /// Element at `index`; out of range is an error carrying index and
    /// count.
    pub fn nth(&self, index: usize) -> DagResult<ValueView> {
        self.get(index)?.ok_or(DagError::IndexOutOfRange {
            index,
            count: self.children.len(),
        })
    }

    /// A new vector view with `value` at `index`; `index == count`
    /// appends. This view is unaffected.
    pub fn assoc(&self, index: usize, value: &Value) -> DagResult<VectorView> {
        if index > self.children.len() {
            return Err(DagError::IndexOutOfRange {
                index,
                count: self.children.len(),
            });
        }
        let child = persist(&self.ctx, value)?;
        let mut children = (*self.children).clone();
        if index == children.len() {
            children.push(child);
        } else {
            children[index] = child;
        }
        let hash = self.ctx.store_record(&ChunkRecord::Vector {
            children: children.clone(),
        })?;
        Ok(VectorView::new(self.ctx.clone(), hash, children))
    }

    /// Elements in order; each step loads at most one new chunk.
    pub fn iter(&self) -> impl Iterator<Item = DagResult<ValueView>> + '_ {
        (0..self.children.len()).map(move |index| self.load_child(index))
    }

    /// Materialize the whole vector.
    pub fn to_plain(&self) -> DagResult<Value> {
        let items = self
            .children
            .iter()
            .map(|hash| load(&self.ctx, hash))
            .collect::<DagResult<Vec<_>>>()?;
        Ok(Value::Vector(items))
    }

    fn load_child(&self, index: usize) -> DagResult<ValueView> {
        if let Some(view) = self.loaded.borrow().get(&index) {
            return Ok(view.clone());
        }
        let view = ValueView::from_hash(&self.ctx, &self.children[index])?;
        self.loaded.borrow_mut().insert(index, view.clone());
        Ok(view)
    }
}

impl std::fmt::Debug for VectorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorView")
            .field("hash", &self.hash)
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use atomdb_cache::NoopChunkCache;
    use atomdb_codec::TextualCodec;
    use atomdb_store::MemoryChunkStore;

    use super::*;

    fn vector_view(v: &Value) -> VectorView {
        let ctx = ChunkContext::new(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(NoopChunkCache),
            Arc::new(TextualCodec),
        );
        let root = persist(&ctx, v).unwrap();
        match ValueView::from_hash(&ctx, &root).unwrap() {
            ValueView::Vector(view) => view,
            other => panic!("expected vector view, got {}", other.kind_name()),
        }
    }

    fn sample() -> Value {
        Value::vector([Value::Int(10), Value::Int(20), Value::Int(30)])
    }

    #[test]
    fn count_without_loads() {
        assert_eq!(vector_view(&sample()).count(), 3);
    }

    #[test]
    fn nth_returns_elements_in_order() {
        let view = vector_view(&sample());
        for (i, expected) in [10i64, 20, 30].into_iter().enumerate() {
            let element = view.nth(i).unwrap();
            assert_eq!(element.as_scalar(), Some(&Value::Int(expected)));
        }
    }

    #[test]
    fn nth_out_of_range_errors_with_positions() {
        let view = vector_view(&sample());
        match view.nth(3) {
            Err(DagError::IndexOutOfRange { index, count }) => {
                assert_eq!((index, count), (3, 3));
            }
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn get_out_of_range_is_none() {
        let view = vector_view(&sample());
        assert!(view.get(99).unwrap().is_none());
    }

    #[test]
    fn assoc_replaces_in_range() {
        let view = vector_view(&sample());
        let updated = view.assoc(1, &Value::Int(99)).unwrap();
        assert_eq!(updated.nth(1).unwrap().as_scalar(), Some(&Value::Int(99)));
        // Original untouched.
        assert_eq!(view.nth(1).unwrap().as_scalar(), Some(&Value::Int(20)));
    }

    #[test]
    fn assoc_at_count_appends() {
        let view = vector_view(&sample());
        let updated = view.assoc(3, &Value::Int(40)).unwrap();
        assert_eq!(updated.count(), 4);
        assert_eq!(updated.nth(3).unwrap().as_scalar(), Some(&Value::Int(40)));
    }

    #[test]
    fn assoc_past_count_errors() {
        let view = vector_view(&sample());
        assert!(matches!(
            view.assoc(4, &Value::Int(50)),
            Err(DagError::IndexOutOfRange { index: 4, count: 3 })
        ));
    }

    #[test]
    fn iteration_is_ordered_and_complete() {
        let view = vector_view(&sample());
        let items: Vec<Value> = view
            .iter()
            .map(|item| item.unwrap().to_plain().unwrap())
            .collect();
        assert_eq!(items, vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
    }

    #[test]
    fn nested_vectors_wrap_lazily() {
        let view = vector_view(&Value::vector([
            Value::vector([Value::Int(1)]),
            Value::Int(2),
        ]));
        let inner = view.nth(0).unwrap();
        assert_eq!(inner.as_vector().map(|v| v.count()), Some(1));
    }

    #[test]
    fn empty_vector() {
        let view = vector_view(&Value::vector([]));
        assert!(view.is_empty());
        assert!(view.get(0).unwrap().is_none());
    }
}
