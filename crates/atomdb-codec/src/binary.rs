use atomdb_types::ChunkRecord;

use crate::error::{CodecError, CodecResult};
use crate::Codec;

/// Compact binary codec with framing: `[4-byte BE length][1-byte tag][payload]`.
///
/// The length covers the tag byte plus the bincode payload. The tag byte is
/// the record's shape tag and is cross-checked against the decoded payload,
/// so a frame whose header and body disagree is rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn encode(&self, record: &ChunkRecord) -> CodecResult<Vec<u8>> {
        let payload =
            bincode::serialize(record).map_err(|e| CodecError::Encode(e.to_string()))?;
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(4 + 1 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(record.tag_byte());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<ChunkRecord> {
        if bytes.len() < 5 {
            return Err(CodecError::Framing("frame too short".into()));
        }
        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if len < 1 {
            return Err(CodecError::Framing("zero-length frame".into()));
        }
        if bytes.len() != 4 + len {
            return Err(CodecError::Framing(format!(
                "length mismatch: header says {}, have {}",
                4 + len,
                bytes.len()
            )));
        }
        let tag = bytes[4];
        let record: ChunkRecord = bincode::deserialize(&bytes[5..])
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        if record.tag_byte() != tag {
            return Err(CodecError::Framing(format!(
                "tag mismatch: header {}, payload {}",
                tag,
                record.tag_byte()
            )));
        }
        Ok(record)
    }
}
