use thiserror::Error;

/// Errors from record encoding and decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),

    /// Binary frame structure violations: bad length, bad tag.
    #[error("frame error: {0}")]
    Framing(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
