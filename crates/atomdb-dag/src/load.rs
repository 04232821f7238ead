use std::collections::{BTreeMap, BTreeSet, VecDeque};

use atomdb_codec::CodecError;
use atomdb_types::{ChunkHash, ChunkRecord, Leaf, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::context::ChunkContext;
use crate::error::{DagError, DagResult};

/// Strictly materialize the full value tree rooted at a hash.
///
/// Every referenced child is loaded recursively through the cache; a child
/// the backend does not know is fatal and names the missing hash. This is
/// the semantic reference for the lazy views: a view and a strict load of
/// the same root denote the same value.
pub fn load(ctx: &ChunkContext, hash: &ChunkHash) -> DagResult<Value> {
    let record = ctx.require_record(hash)?;
    load_record(ctx, &record)
}

/// Materialize a value from an already-decoded record.
pub fn load_record(ctx: &ChunkContext, record: &ChunkRecord) -> DagResult<Value> {
    Ok(match record {
        ChunkRecord::Map { children } => Value::Map(
            children
                .iter()
                .map(|(key, hash)| Ok((key.clone(), load(ctx, hash)?)))
                .collect::<DagResult<BTreeMap<_, _>>>()?,
        ),
        ChunkRecord::Vector { children } => Value::Vector(
            children
                .iter()
                .map(|hash| load(ctx, hash))
                .collect::<DagResult<Vec<_>>>()?,
        ),
        ChunkRecord::List { children } => Value::List(
            children
                .iter()
                .map(|hash| load(ctx, hash))
                .collect::<DagResult<VecDeque<_>>>()?,
        ),
        ChunkRecord::Set { children } => Value::Set(
            children
                .iter()
                .map(|hash| load(ctx, hash))
                .collect::<DagResult<BTreeSet<_>>>()?,
        ),
        scalar => scalar_value(scalar)?,
    })
}

/// Reify a scalar record into its value.
pub(crate) fn scalar_value(record: &ChunkRecord) -> DagResult<Value> {
    Ok(match record {
        ChunkRecord::Keyword { ns, name } => Value::Keyword(atomdb_types::Keyword {
            ns: ns.clone(),
            name: name.clone(),
        }),
        ChunkRecord::Symbol { value } => Value::Symbol(value.clone()),
        ChunkRecord::String { value } => Value::Str(value.clone()),
        ChunkRecord::Uuid { value } => Value::Uuid(*value),
        ChunkRecord::Date { value } => Value::Timestamp(parse_instant(value)?),
        ChunkRecord::Bigdec { value } => Value::Bigdec(value.clone()),
        ChunkRecord::Ratio { value } => Value::Ratio(value.clone()),
        ChunkRecord::Bool { value } => Value::Bool(*value),
        ChunkRecord::Leaf { value } => match value {
            Leaf::Null => Value::Null,
            Leaf::Int(i) => Value::Int(*i),
            Leaf::Float(f) => Value::Float(*f),
        },
        ChunkRecord::Map { .. }
        | ChunkRecord::Vector { .. }
        | ChunkRecord::List { .. }
        | ChunkRecord::Set { .. } => {
            unreachable!("collection records are reified by the loader")
        }
    })
}

fn parse_instant(text: &str) -> DagResult<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339)
        .map_err(|e| DagError::Codec(CodecError::Decode(format!("date chunk: {e}"))))
}
