use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use atomdb_types::{ChunkHash, ChunkRecord, Value};

use crate::context::ChunkContext;
use crate::error::{DagError, DagResult};
use crate::load::load;
use crate::persist::persist;
use crate::views::ValueView;

/// Lazy view over a list node.
///
/// Same child-table shape as a vector, but grown at the front:
/// [`cons`](Self::cons) prepends the new element's hash.
#[derive(Clone)]
pub struct ListView {
    ctx: ChunkContext,
    hash: ChunkHash,
    children: Arc<Vec<ChunkHash>>,
    loaded: Rc<RefCell<HashMap<usize, ValueView>>>,
}

impl ListView {
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

    /// The hash of the underlying list chunk.
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

    /// Element at `index`; out of range is an error.
    pub fn nth(&self, index: usize) -> DagResult<ValueView> {
        self.get(index)?.ok_or(DagError::IndexOutOfRange {
            index,
            count: self.children.len(),
        })
    }

    /// The first element, if any.
    pub fn first(&self) -> DagResult<Option<ValueView>> {
        self.get(0)
    }

    /// A new list view with `value` prepended; this view is unaffected.
    pub fn cons(&self, value: &Value) -> DagResult<ListView> {
        let child = persist(&self.ctx, value)?;
        let mut children = Vec::with_capacity(self.children.len() + 1);
        children.push(child);
        children.extend(self.children.iter().copied());
        let hash = self.ctx.store_record(&ChunkRecord::List {
            children: children.clone(),
        })?;
        Ok(ListView::new(self.ctx.clone(), hash, children))
    }

    /// Elements front to back; each step loads at most one new chunk.
    pub fn iter(&self) -> impl Iterator<Item = DagResult<ValueView>> + '_ {
        (0..self.children.len()).map(move |index| self.load_child(index))
    }

    /// Materialize the whole list.
    pub fn to_plain(&self) -> DagResult<Value> {
        let items = self
            .children
            .iter()
            .map(|hash| load(&self.ctx, hash))
            .collect::<DagResult<VecDeque<_>>>()?;
        Ok(Value::List(items))
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

impl std::fmt::Debug for ListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("hash", &self.hash)
            .field("count", &self.count())
            .finish()
    }
}
