use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::ChunkHash;
use crate::value::Value;

/// Scalar payload of a `leaf` chunk: the kinds without a dedicated tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leaf {
    Null,
    Int(i64),
    Float(f64),
}

/// A tagged node as written to the chunk store.
///
/// Collection records hold child hashes; scalar records hold their payload
/// inline. Map children keep the key as an embedded value so key containment
/// never needs a child load; the pairs are stored in canonical key order.
/// Set children are stored sorted by child hash, which makes equal sets
/// hash identically regardless of insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkRecord {
    Map { children: Vec<(Value, ChunkHash)> },
    Vector { children: Vec<ChunkHash> },
    List { children: Vec<ChunkHash> },
    Set { children: Vec<ChunkHash> },
    Keyword { ns: Option<String>, name: String },
    Symbol { value: String },
    String { value: String },
    Uuid { value: Uuid },
    /// ISO-8601/RFC 3339 instant, always UTC.
    Date { value: String },
    Bigdec { value: String },
    Ratio { value: String },
    Bool { value: bool },
    Leaf { value: Leaf },
}

impl ChunkRecord {
    /// The record's tag name, as used by the textual codec.
    pub fn tag_name(&self) -> &'static str {
        match self {
            ChunkRecord::Map { .. } => "map",
            ChunkRecord::Vector { .. } => "vector",
            ChunkRecord::List { .. } => "list",
            ChunkRecord::Set { .. } => "set",
            ChunkRecord::Keyword { .. } => "keyword",
            ChunkRecord::Symbol { .. } => "symbol",
            ChunkRecord::String { .. } => "string",
            ChunkRecord::Uuid { .. } => "uuid",
            ChunkRecord::Date { .. } => "date",
            ChunkRecord::Bigdec { .. } => "bigdec",
            ChunkRecord::Ratio { .. } => "ratio",
            ChunkRecord::Bool { .. } => "bool",
            ChunkRecord::Leaf { .. } => "leaf",
        }
    }

    /// Stable one-byte shape tag for the binary codec framing.
    pub fn tag_byte(&self) -> u8 {
        match self {
            ChunkRecord::Map { .. } => 1,
            ChunkRecord::Vector { .. } => 2,
            ChunkRecord::List { .. } => 3,
            ChunkRecord::Set { .. } => 4,
            ChunkRecord::Keyword { .. } => 5,
            ChunkRecord::Symbol { .. } => 6,
            ChunkRecord::String { .. } => 7,
            ChunkRecord::Uuid { .. } => 8,
            ChunkRecord::Date { .. } => 9,
            ChunkRecord::Bigdec { .. } => 10,
            ChunkRecord::Ratio { .. } => 11,
            ChunkRecord::Bool { .. } => 12,
            ChunkRecord::Leaf { .. } => 13,
        }
    }

    /// Returns `true` for collection records, whose payload is child hashes.
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            ChunkRecord::Map { .. }
                | ChunkRecord::Vector { .. }
                | ChunkRecord::List { .. }
                | ChunkRecord::Set { .. }
        )
    }

    /// Number of direct children of a collection record; zero for scalars.
    pub fn child_count(&self) -> usize {
        match self {
            ChunkRecord::Map { children } => children.len(),
            ChunkRecord::Vector { children }
            | ChunkRecord::List { children }
            | ChunkRecord::Set { children } => children.len(),
            _ => 0,
        }
    }
}
