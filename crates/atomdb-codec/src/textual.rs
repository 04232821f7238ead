use atomdb_types::{ChunkRecord, Leaf, Value};

use crate::error::{CodecError, CodecResult};
use crate::Codec;

/// Self-describing textual codec: canonical JSON over the tagged record
/// enum.
///
/// Determinism comes from the record shape itself: struct fields serialize
/// in declaration order, map children are sorted pair vectors, and
/// timestamps are normalized to UTC. Output is compact (no whitespace),
/// UTF-8.
///
/// JSON has no representation for non-finite floats, so records containing
/// `NaN` or infinities are rejected at encode time rather than silently
/// degraded.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextualCodec;

impl Codec for TextualCodec {
    fn name(&self) -> &'static str {
        "textual"
    }

    fn encode(&self, record: &ChunkRecord) -> CodecResult<Vec<u8>> {
        reject_non_finite(record)?;
        serde_json::to_vec(record).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<ChunkRecord> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

fn reject_non_finite(record: &ChunkRecord) -> CodecResult<()> {
    match record {
        ChunkRecord::Leaf {
            value: Leaf::Float(f),
        } if !f.is_finite() => Err(non_finite(*f)),
        ChunkRecord::Map { children } => {
            for (key, _) in children {
                value_finite(key)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn value_finite(value: &Value) -> CodecResult<()> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(non_finite(*f)),
        Value::Map(m) => {
            for (k, v) in m {
                value_finite(k)?;
                value_finite(v)?;
            }
            Ok(())
        }
        Value::Vector(xs) => xs.iter().try_for_each(value_finite),
        Value::List(xs) => xs.iter().try_for_each(value_finite),
        Value::Set(xs) => xs.iter().try_for_each(value_finite),
        _ => Ok(()),
    }
}

fn non_finite(f: f64) -> CodecError {
    CodecError::Encode(format!("non-finite float {f} has no textual form"))
}
