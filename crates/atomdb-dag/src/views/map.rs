use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use atomdb_types::{ChunkHash, ChunkRecord, Value};

use crate::context::ChunkContext;
use crate::error::DagResult;
use crate::load::load;
use crate::persist::persist;
use crate::views::ValueView;

/// Lazy view over a map node.
///
/// The child table maps embedded key values to child hashes in canonical
/// key order, so key lookup and containment never load a child. Values
/// load on first access and are memoized per view.
#[derive(Clone)]
pub struct MapView {
    ctx: ChunkContext,
    hash: ChunkHash,
    children: Arc<Vec<(Value, ChunkHash)>>,
    loaded: Rc<RefCell<HashMap<Value, ValueView>>>,
}

impl MapView {
    pub(crate) fn new(ctx: ChunkContext, hash: ChunkHash, children: Vec<(Value, ChunkHash)>) -> Self {
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

    /// The hash of the underlying map chunk.
    pub fn content_hash(&self) -> &ChunkHash {
        &self.hash
    }

    /// Number of entries, without loading any child.
    pub fn count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Key containment from the child table alone — no loads.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.index_of(key).is_some()
    }

    /// Keys in canonical order, without loading any child.
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.children.iter().map(|(key, _)| key)
    }

    /// Look up the value for a key, loading its chunk on first access.
    pub fn get(&self, key: &Value) -> DagResult<Option<ValueView>> {
        match self.index_of(key) {
            Some(index) => self.load_entry(index).map(|(_, view)| Some(view)),
            None => Ok(None),
        }
    }

    /// Entries in canonical key order. Each step loads at most one new
    /// child chunk; a child that fails to load yields an `Err` item and
    /// iteration can continue past it.
    pub fn iter(&self) -> impl Iterator<Item = DagResult<(Value, ValueView)>> + '_ {
        (0..self.children.len()).map(move |index| self.load_entry(index))
    }

    /// A new map view with `key` bound to `value`; this view is unaffected.
    pub fn assoc(&self, key: Value, value: &Value) -> DagResult<MapView> {
        let child = persist(&self.ctx, value)?;
        let mut children = (*self.children).clone();
        match children.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(index) => children[index] = (key, child),
            Err(index) => children.insert(index, (key, child)),
        }
        let hash = self.ctx.store_record(&ChunkRecord::Map {
            children: children.clone(),
        })?;
        Ok(MapView::new(self.ctx.clone(), hash, children))
    }

    /// A new map view without `key`; this view is unaffected.
    pub fn dissoc(&self, key: &Value) -> DagResult<MapView> {
        match self.index_of(key) {
            None => Ok(MapView::new(
                self.ctx.clone(),
                self.hash,
                (*self.children).clone(),
            )),
            Some(index) => {
                let mut children = (*self.children).clone();
                children.remove(index);
                let hash = self.ctx.store_record(&ChunkRecord::Map {
                    children: children.clone(),
                })?;
                Ok(MapView::new(self.ctx.clone(), hash, children))
            }
        }
    }

    /// Materialize the whole map.
    pub fn to_plain(&self) -> DagResult<Value> {
        let entries = self
            .children
            .iter()
            .map(|(key, hash)| Ok((key.clone(), load(&self.ctx, hash)?)))
            .collect::<DagResult<_>>()?;
        Ok(Value::Map(entries))
    }

    fn index_of(&self, key: &Value) -> Option<usize> {
        self.children
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
    }

    fn load_entry(&self, index: usize) -> DagResult<(Value, ValueView)> {
        let (key, child_hash) = &self.children[index];
        if let Some(view) = self.loaded.borrow().get(key) {
            return Ok((key.clone(), view.clone()));
        }
        let view = ValueView::from_hash(&self.ctx, child_hash)?;
        self.loaded
            .borrow_mut()
            .insert(key.clone(), view.clone());
        Ok((key.clone(), view))
    }
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
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

    fn map_view(v: &Value) -> MapView {
        let ctx = ChunkContext::new(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(NoopChunkCache),
            Arc::new(TextualCodec),
        );
        let root = persist(&ctx, v).unwrap();
        match ValueView::from_hash(&ctx, &root).unwrap() {
            ValueView::Map(view) => view,
            other => panic!("expected map view, got {}", other.kind_name()),
        }
    }

    fn sample() -> Value {
        Value::map([
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::vector([Value::Int(2), Value::Int(3)])),
            (Value::from("c"), Value::from("three")),
        ])
    }

    #[test]
    fn count_and_containment_without_loads() {
        let view = map_view(&sample());
        assert_eq!(view.count(), 3);
        assert!(view.contains_key(&Value::from("b")));
        assert!(!view.contains_key(&Value::from("z")));
    }

    #[test]
    fn keys_are_canonically_ordered() {
        let view = map_view(&sample());
        let keys: Vec<&Value> = view.keys().collect();
        assert_eq!(
            keys,
            vec![&Value::from("a"), &Value::from("b"), &Value::from("c")]
        );
    }

    #[test]
    fn get_returns_scalars_materialized() {
        let view = map_view(&sample());
        let a = view.get(&Value::from("a")).unwrap().unwrap();
        assert_eq!(a.as_scalar(), Some(&Value::Int(1)));
    }

    #[test]
    fn get_returns_nested_collections_as_views() {
        let view = map_view(&sample());
        let b = view.get(&Value::from("b")).unwrap().unwrap();
        let nested = b.as_vector().expect("nested vector view");
        assert_eq!(nested.count(), 2);
    }

    #[test]
    fn get_missing_key_is_none() {
        let view = map_view(&sample());
        assert!(view.get(&Value::from("zzz")).unwrap().is_none());
    }

    #[test]
    fn composite_keys_work() {
        let key = Value::vector([Value::Int(1), Value::Int(2)]);
        let view = map_view(&Value::map([(key.clone(), Value::from("found"))]));
        assert!(view.contains_key(&key));
        let got = view.get(&key).unwrap().unwrap();
        assert_eq!(got.as_scalar(), Some(&Value::from("found")));
    }

    #[test]
    fn iteration_yields_all_entries_in_order() {
        let view = map_view(&sample());
        let entries: Vec<(Value, Value)> = view
            .iter()
            .map(|entry| {
                let (key, value) = entry.unwrap();
                (key, value.to_plain().unwrap())
            })
            .collect();
        assert_eq!(entries[0].0, Value::from("a"));
        assert_eq!(entries[2].1, Value::from("three"));
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn assoc_builds_a_new_view_and_preserves_the_old() {
        let view = map_view(&sample());
        let updated = view.assoc(Value::from("d"), &Value::Int(4)).unwrap();

        assert_eq!(view.count(), 3);
        assert_eq!(updated.count(), 4);
        assert!(!view.contains_key(&Value::from("d")));
        assert!(updated.contains_key(&Value::from("d")));
        assert_ne!(view.content_hash(), updated.content_hash());
    }

    #[test]
    fn assoc_replaces_existing_key() {
        let view = map_view(&sample());
        let updated = view.assoc(Value::from("a"), &Value::Int(100)).unwrap();
        assert_eq!(updated.count(), 3);
        let a = updated.get(&Value::from("a")).unwrap().unwrap();
        assert_eq!(a.as_scalar(), Some(&Value::Int(100)));
    }

    #[test]
    fn assoc_equals_plain_update() {
        // Functional update through the view hashes identically to
        // persisting the updated plain value.
        let view = map_view(&sample());
        let updated = view.assoc(Value::from("d"), &Value::Int(4)).unwrap();

        let mut plain = match sample() {
            Value::Map(m) => m,
            _ => unreachable!(),
        };
        plain.insert(Value::from("d"), Value::Int(4));
        assert!(ValueView::Map(updated).eq_plain(&Value::Map(plain)).unwrap());
    }

    #[test]
    fn dissoc_removes_a_key() {
        let view = map_view(&sample());
        let updated = view.dissoc(&Value::from("b")).unwrap();
        assert_eq!(updated.count(), 2);
        assert!(!updated.contains_key(&Value::from("b")));
        assert_eq!(view.count(), 3);
    }

    #[test]
    fn dissoc_missing_key_denotes_the_same_map() {
        let view = map_view(&sample());
        let same = view.dissoc(&Value::from("zzz")).unwrap();
        assert_eq!(view.content_hash(), same.content_hash());
    }

    #[test]
    fn repeated_get_hits_the_memo() {
        let view = map_view(&sample());
        let first = view.get(&Value::from("a")).unwrap().unwrap();
        let second = view.get(&Value::from("a")).unwrap().unwrap();
        assert_eq!(first.content_hash(), second.content_hash());
    }
}
