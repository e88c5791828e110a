//! Rust port of binarytf — a compact binary serialization format for
//! dynamic value graphs.
//!
//! One leading token byte identifies each value's kind; numbers take the
//! narrowest exact form (byte, int32, float64, with separate sign tokens);
//! strings and variable-length composites are terminated by a reserved 0x00
//! byte; and every reference-typed value is numbered on first visit so that
//! shared and cyclic structures round trip with identity intact.
//!
//! Encode and decode are pure call/return operations with no I/O and no
//! shared state between calls. Recursion depth is bounded by the depth of
//! the input graph: very deeply nested (non-cyclic) inputs can exhaust the
//! call stack, so callers feeding untrusted deeply nested data should bound
//! input depth or pre-flatten.
//!
//! # Example
//!
//! ```
//! use binarytf::{deserialize, serialize, Value};
//!
//! let data = serialize(&Value::string("Hello")).unwrap();
//! assert_eq!(data.len(), 7); // token + 5 bytes + terminator
//! assert_eq!(deserialize(&data).unwrap(), Value::string("Hello"));
//! ```

mod deserializer;
mod error;
mod serializer;
mod tokens;
mod value;

pub use deserializer::Deserializer;
pub use error::{DeserializerError, SerializerError};
pub use serializer::{OnUnsupported, Serializer};
pub use tokens::{BinaryToken, NULL_TERMINATOR};
pub use value::{
    ArrayElement, DateValue, ExternalRef, ObjectKey, RegExpValue, TypedArrayKind,
    TypedArrayValue, Value, WeakMapValue, WeakSetValue,
};

/// A decoded value together with its continuation offset.
#[derive(Debug, Clone, PartialEq)]
pub struct DeserializedMetadata {
    pub value: Value,
    /// Byte position immediately after the consumed value, or `None` when
    /// the value ran exactly to the end of the buffer.
    pub offset: Option<usize>,
}

/// Serializes one root value into a finished byte sequence.
pub fn serialize(value: &Value) -> Result<Vec<u8>, SerializerError> {
    Serializer::new().process(value)
}

/// Serializes with an unsupported-value hook installed. The hook is called
/// for every [`Value::External`] encountered and its return value is
/// encoded in place of the original; a substitute that is itself
/// unsupported aborts the encode.
pub fn serialize_with(
    value: &Value,
    on_unsupported: &OnUnsupported,
) -> Result<Vec<u8>, SerializerError> {
    Serializer::with_handler(on_unsupported).process(value)
}

/// Deserializes one value from the start of `data`.
pub fn deserialize(data: &[u8]) -> Result<Value, DeserializerError> {
    deserialize_at(data, 0)
}

/// Deserializes one value starting at `offset`.
pub fn deserialize_at(data: &[u8], offset: usize) -> Result<Value, DeserializerError> {
    Deserializer::at_offset(data, offset).read()
}

/// Deserializes one value starting at `offset` and also returns the offset
/// immediately following it, for chaining through a buffer that holds
/// several independently serialized values.
///
/// ```
/// use binarytf::{deserialize_with_metadata, serialize, Value};
///
/// let mut data = serialize(&Value::string("Hello")).unwrap();
/// data.extend(serialize(&Value::string("World")).unwrap());
///
/// let first = deserialize_with_metadata(&data, 0).unwrap();
/// assert_eq!(first.value, Value::string("Hello"));
/// let second = deserialize_with_metadata(&data, first.offset.unwrap()).unwrap();
/// assert_eq!(second.value, Value::string("World"));
/// assert_eq!(second.offset, None);
/// ```
pub fn deserialize_with_metadata(
    data: &[u8],
    offset: usize,
) -> Result<DeserializedMetadata, DeserializerError> {
    let mut deserializer = Deserializer::at_offset(data, offset);
    let value = deserializer.read()?;
    let offset = if deserializer.finished() {
        None
    } else {
        Some(deserializer.offset())
    };
    Ok(DeserializedMetadata { value, offset })
}
