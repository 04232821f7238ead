use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use atomdb_types::{ChunkHash, ChunkRecord, Value};

use crate::context::ChunkContext;
use crate::error::DagResult;
use crate::load::load;
use crate::persist::{persist, persist_hash};
use crate::views::ValueView;

/// Lazy view over a set node.
///
/// The child table is the child-hash sequence sorted by hash. Equal values
/// hash equally under a fixed codec, so membership reduces to computing the
/// probe's hash (a pure encode, no I/O) and binary-searching the table.
#[derive(Clone)]
pub struct SetView {
    ctx: ChunkContext,
    hash: ChunkHash,
    children: Arc<Vec<ChunkHash>>,
    loaded: Rc<RefCell<HashMap<usize, ValueView>>>,
}

impl SetView {
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

    /// The hash of the underlying set chunk.
    pub fn content_hash(&self) -> &ChunkHash {
        &self.hash
    }

    /// Number of members, without loading any child.
    pub fn count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Membership by value. Computes the probe's chunk hash without
    /// touching the store and searches the child table.
    pub fn contains(&self, value: &Value) -> DagResult<bool> {
        let probe = persist_hash(self.ctx.codec().as_ref(), value)?;
        Ok(self.children.binary_search(&probe).is_ok())
    }

    /// A new set view including `value`; this view is unaffected. Adding an
    /// existing member denotes the same set, so no duplicate child can
    /// appear.
    pub fn conj(&self, value: &Value) -> DagResult<SetView> {
        let child = persist(&self.ctx, value)?;
        match self.children.binary_search(&child) {
            Ok(_) => Ok(SetView::new(
                self.ctx.clone(),
                self.hash,
                (*self.children).clone(),
            )),
            Err(index) => {
                let mut children = (*self.children).clone();
                children.insert(index, child);
                let hash = self.ctx.store_record(&ChunkRecord::Set {
                    children: children.clone(),
                })?;
                Ok(SetView::new(self.ctx.clone(), hash, children))
            }
        }
    }

    /// A new set view without `value`; this view is unaffected.
    pub fn disj(&self, value: &Value) -> DagResult<SetView> {
        let probe = persist_hash(self.ctx.codec().as_ref(), value)?;
        match self.children.binary_search(&probe) {
            Err(_) => Ok(SetView::new(
                self.ctx.clone(),
                self.hash,
                (*self.children).clone(),
            )),
            Ok(index) => {
                let mut children = (*self.children).clone();
                children.remove(index);
                let hash = self.ctx.store_record(&ChunkRecord::Set {
                    children: children.clone(),
                })?;
                Ok(SetView::new(self.ctx.clone(), hash, children))
            }
        }
    }

    /// Members in hash order; each step loads at most one new chunk.
    pub fn iter(&self) -> impl Iterator<Item = DagResult<ValueView>> + '_ {
        (0..self.children.len()).map(move |index| self.load_child(index))
    }

    /// Materialize the whole set.
    pub fn to_plain(&self) -> DagResult<Value> {
        let members = self
            .children
            .iter()
            .map(|hash| load(&self.ctx, hash))
            .collect::<DagResult<BTreeSet<_>>>()?;
        Ok(Value::Set(members))
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

impl std::fmt::Debug for SetView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetView")
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

    fn context() -> ChunkContext {
        ChunkContext::new(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(NoopChunkCache),
            Arc::new(TextualCodec),
        )
    }

    fn set_view(ctx: &ChunkContext, v: &Value) -> SetView {
        let root = persist(ctx, v).unwrap();
        match ValueView::from_hash(ctx, &root).unwrap() {
            ValueView::Set(view) => view,
            other => panic!("expected set view, got {}", other.kind_name()),
        }
    }

    fn sample() -> Value {
        Value::set([Value::Int(1), Value::Int(2), Value::Int(3)])
    }

    #[test]
    fn count_without_loads() {
        let ctx = context();
        assert_eq!(set_view(&ctx, &sample()).count(), 3);
    }

    #[test]
    fn contains_present_and_absent() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        assert!(view.contains(&Value::Int(2)).unwrap());
        assert!(!view.contains(&Value::Int(4)).unwrap());
        // Same number, different kind: not a member.
        assert!(!view.contains(&Value::Float(2.0)).unwrap());
    }

    #[test]
    fn contains_composite_member() {
        let ctx = context();
        let member = Value::map([(Value::from("k"), Value::Int(1))]);
        let view = set_view(&ctx, &Value::set([member.clone()]));
        assert!(view.contains(&member).unwrap());
    }

    #[test]
    fn conj_adds_a_member() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        let bigger = view.conj(&Value::Int(4)).unwrap();
        assert_eq!(bigger.count(), 4);
        assert!(bigger.contains(&Value::Int(4)).unwrap());
        assert_eq!(view.count(), 3);
    }

    #[test]
    fn conj_existing_member_changes_nothing() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        let same = view.conj(&Value::Int(2)).unwrap();
        assert_eq!(same.count(), 3);
        assert_eq!(view.content_hash(), same.content_hash());
    }

    #[test]
    fn conj_agrees_with_plain_set() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        let bigger = view.conj(&Value::Int(4)).unwrap();
        let plain = Value::set([Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
        assert_eq!(*bigger.content_hash(), persist(&ctx, &plain).unwrap());
    }

    #[test]
    fn disj_removes_a_member() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        let smaller = view.disj(&Value::Int(2)).unwrap();
        assert_eq!(smaller.count(), 2);
        assert!(!smaller.contains(&Value::Int(2)).unwrap());
        assert!(view.contains(&Value::Int(2)).unwrap());
    }

    #[test]
    fn disj_absent_member_denotes_the_same_set() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        let same = view.disj(&Value::Int(9)).unwrap();
        assert_eq!(view.content_hash(), same.content_hash());
    }

    #[test]
    fn iteration_yields_every_member_once() {
        let ctx = context();
        let view = set_view(&ctx, &sample());
        let members: BTreeSet<Value> = view
            .iter()
            .map(|m| m.unwrap().to_plain().unwrap())
            .collect();
        assert_eq!(
            members,
            BTreeSet::from([Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn to_plain_ignores_child_order() {
        let ctx = context();
        let forward = set_view(&ctx, &sample());
        let backward = set_view(
            &ctx,
            &Value::set([Value::Int(3), Value::Int(2), Value::Int(1)]),
        );
        assert_eq!(forward.content_hash(), backward.content_hash());
        assert_eq!(forward.to_plain().unwrap(), backward.to_plain().unwrap());
    }
}
