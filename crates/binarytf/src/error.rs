//! Encode-time and decode-time error taxonomies.

use binarytf_buffers::BufferError;
use thiserror::Error;

/// Failures while serializing a value graph. All are immediate and
/// non-recoverable for the current call; retry with a hook installed is a
/// caller-level concern.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SerializerError {
    /// The value is outside the serializable taxonomy and no
    /// unsupported-value hook is installed.
    #[error("unsupported type: value cannot be serialized")]
    UnsupportedType,
    /// The hook's substitute was itself unsupported. Only one level of
    /// substitution is permitted.
    #[error("unsupported serialized type: the substituted value cannot be serialized")]
    UnsupportedSerializedType,
    /// A string contains the reserved 0x00 terminator byte.
    #[error("unexpected null value: string contains the reserved null terminator byte")]
    UnexpectedNullValue,
}

/// Failures while deserializing a byte stream. Any of these means the input
/// is truncated, corrupt, or adversarial.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeserializerError {
    /// The leading byte matches no token in the table.
    #[error("unknown type received: {0}")]
    UnknownType(u8),
    /// A read (including a terminator scan) ran past the available bytes.
    #[error("unexpected end of buffer, expected {expected} more byte(s)")]
    UnexpectedEndOfBuffer { expected: usize },
    /// An object reference named a slot that was never registered.
    #[error("object reference to unregistered slot {0}")]
    UnknownObjectReference(u32),
}

impl From<BufferError> for DeserializerError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { expected } => {
                DeserializerError::UnexpectedEndOfBuffer { expected }
            }
            // Strings are decoded lossily, so this only arises from direct
            // reader misuse; treat it as corrupt input.
            BufferError::InvalidUtf8 => DeserializerError::UnexpectedEndOfBuffer { expected: 1 },
        }
    }
}
