use thiserror::Error;

/// Failures surfaced by the message codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying stream failed while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output would not fit in the destination buffer.
    /// Nothing written to the destination is meaningful after this.
    #[error("serialized message needs {needed} bytes, destination holds {capacity}")]
    BufferOverflow { needed: usize, capacity: usize },

    /// A bounded field was longer than its limit. Only raised in strict mode.
    #[error("field `{field}` exceeds {limit} bytes")]
    FieldTruncated { field: &'static str, limit: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
