use atomdb_codec::{Codec, CodecError};
use atomdb_types::{ChunkHash, ChunkRecord, Leaf, Value};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::context::ChunkContext;
use crate::error::{DagError, DagResult};

/// Recursively decompose a value into chunks and return the root hash.
///
/// Collections are persisted children-first, so every child hash in a node
/// resolves in the store before the node itself is written. Map children
/// are emitted in canonical key order, vector and list children in
/// positional order, and set children sorted by child hash, which makes
/// equal values hash identically regardless of how they were built.
///
/// Persisting is idempotent: re-persisting an existing subtree re-derives
/// the same hashes and the store's `put` leaves the existing chunks alone.
/// A persist that fails mid-tree may leave already-written child chunks
/// behind; the store is append-only and never garbage-collected, so those
/// orphans are harmless.
pub fn persist(ctx: &ChunkContext, value: &Value) -> DagResult<ChunkHash> {
    let mut path = Vec::new();
    persist_inner(ctx, value, &mut path)
}

fn persist_inner(ctx: &ChunkContext, value: &Value, path: &mut Vec<String>) -> DagResult<ChunkHash> {
    let record = match value {
        Value::Map(entries) => {
            // BTreeMap iteration order is the canonical key order.
            let mut children = Vec::with_capacity(entries.len());
            for (key, child) in entries {
                path.push(key_label(key));
                let hash = persist_inner(ctx, child, path)?;
                path.pop();
                children.push((key.clone(), hash));
            }
            ChunkRecord::Map { children }
        }
        Value::Vector(items) => ChunkRecord::Vector {
            children: persist_items(ctx, items.iter(), path)?,
        },
        Value::List(items) => ChunkRecord::List {
            children: persist_items(ctx, items.iter(), path)?,
        },
        Value::Set(items) => {
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                path.push(key_label(item));
                children.push(persist_inner(ctx, item, path)?);
                path.pop();
            }
            children.sort();
            ChunkRecord::Set { children }
        }
        scalar => scalar_record(scalar).map_err(|e| annotate(path, e))?,
    };
    ctx.store_record(&record).map_err(|e| annotate(path, e))
}

fn persist_items<'a>(
    ctx: &ChunkContext,
    items: impl Iterator<Item = &'a Value>,
    path: &mut Vec<String>,
) -> DagResult<Vec<ChunkHash>> {
    let mut children = Vec::new();
    for (index, item) in items.enumerate() {
        path.push(index.to_string());
        children.push(persist_inner(ctx, item, path)?);
        path.pop();
    }
    Ok(children)
}

/// Compute the hash a value would persist to, by pure encoding — no store
/// writes, no cache traffic. Agrees with [`persist`] by construction: both
/// build the same records and hash the same codec bytes.
pub fn persist_hash(codec: &dyn Codec, value: &Value) -> DagResult<ChunkHash> {
    let record = match value {
        Value::Map(entries) => ChunkRecord::Map {
            children: entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), persist_hash(codec, v)?)))
                .collect::<DagResult<Vec<_>>>()?,
        },
        Value::Vector(items) => ChunkRecord::Vector {
            children: items
                .iter()
                .map(|v| persist_hash(codec, v))
                .collect::<DagResult<Vec<_>>>()?,
        },
        Value::List(items) => ChunkRecord::List {
            children: items
                .iter()
                .map(|v| persist_hash(codec, v))
                .collect::<DagResult<Vec<_>>>()?,
        },
        Value::Set(items) => {
            let mut children = items
                .iter()
                .map(|v| persist_hash(codec, v))
                .collect::<DagResult<Vec<_>>>()?;
            children.sort();
            ChunkRecord::Set { children }
        }
        scalar => scalar_record(scalar)?,
    };
    Ok(ChunkHash::of_bytes(&codec.encode(&record)?))
}

/// Build the chunk record for a scalar value.
pub(crate) fn scalar_record(value: &Value) -> DagResult<ChunkRecord> {
    Ok(match value {
        Value::Null => ChunkRecord::Leaf { value: Leaf::Null },
        Value::Bool(b) => ChunkRecord::Bool { value: *b },
        Value::Int(i) => ChunkRecord::Leaf { value: Leaf::Int(*i) },
        Value::Float(f) => ChunkRecord::Leaf {
            value: Leaf::Float(*f),
        },
        Value::Bigdec(s) => ChunkRecord::Bigdec { value: s.clone() },
        Value::Ratio(s) => ChunkRecord::Ratio { value: s.clone() },
        Value::Str(s) => ChunkRecord::String { value: s.clone() },
        Value::Symbol(s) => ChunkRecord::Symbol { value: s.clone() },
        Value::Keyword(k) => ChunkRecord::Keyword {
            ns: k.ns.clone(),
            name: k.name.clone(),
        },
        Value::Uuid(u) => ChunkRecord::Uuid { value: *u },
        Value::Timestamp(t) => ChunkRecord::Date {
            value: format_instant(t)?,
        },
        Value::Map(_) | Value::Vector(_) | Value::List(_) | Value::Set(_) => {
            unreachable!("collection nodes are assembled by the persister")
        }
    })
}

fn format_instant(instant: &OffsetDateTime) -> DagResult<String> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| DagError::Codec(CodecError::Encode(format!("timestamp: {e}"))))
}

/// Compact label for one step of an error path.
fn key_label(key: &Value) -> String {
    match key {
        Value::Str(s) => s.clone(),
        Value::Symbol(s) => s.clone(),
        Value::Keyword(k) => k.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Uuid(u) => u.to_string(),
        other => other.kind_name().to_string(),
    }
}

fn annotate(path: &[String], err: DagError) -> DagError {
    if matches!(err, DagError::Persist { .. }) {
        return err;
    }
    let path = if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    };
    DagError::Persist {
        path,
        source: Box::new(err),
    }
}
