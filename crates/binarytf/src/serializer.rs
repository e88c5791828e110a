//! `Serializer` — depth-first encoder for [`Value`] graphs.
//!
//! Reference-typed values are registered in an identity-keyed table at the
//! moment they are first visited, before their children, so repeated and
//! cyclic occurrences are emitted as back-references instead of recursing
//! forever.

use std::collections::HashMap;

use binarytf_buffers::Writer;
use num_bigint::Sign;

use crate::error::SerializerError;
use crate::tokens::{BinaryToken, NULL_TERMINATOR};
use crate::value::{ArrayElement, ObjectKey, Value};

const MIN_INT32: f64 = -2147483648.0;
const MAX_INT32: f64 = 2147483647.0;
const MAX_BYTE: f64 = 255.0;

/// Hook consulted for [`Value::External`]; returns the substitute to encode
/// in place of the unsupported value.
pub type OnUnsupported = dyn Fn(&Value) -> Value;

pub struct Serializer<'a> {
    writer: Writer,
    object_ids: HashMap<usize, u32>,
    on_unsupported: Option<&'a OnUnsupported>,
    handling_unsupported: bool,
}

impl Default for Serializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Serializer<'a> {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
            object_ids: HashMap::new(),
            on_unsupported: None,
            handling_unsupported: false,
        }
    }

    /// Creates a serializer with an unsupported-value hook installed.
    pub fn with_handler(on_unsupported: &'a OnUnsupported) -> Self {
        Self {
            on_unsupported: Some(on_unsupported),
            ..Self::new()
        }
    }

    /// Encodes one root value and returns the finished byte sequence.
    pub fn process(&mut self, value: &Value) -> Result<Vec<u8>, SerializerError> {
        self.writer.reset();
        self.object_ids.clear();
        self.handling_unsupported = false;
        self.parse(value)?;
        Ok(self.writer.flush())
    }

    fn parse(&mut self, value: &Value) -> Result<(), SerializerError> {
        match value {
            Value::Null => {
                self.writer.u8(BinaryToken::Null as u8);
                Ok(())
            }
            Value::Undefined => {
                self.writer.u8(BinaryToken::Undefined as u8);
                Ok(())
            }
            Value::Bool(b) => {
                self.writer.u8(BinaryToken::Boolean as u8);
                self.writer.u8(*b as u8);
                Ok(())
            }
            Value::Number(n) => {
                self.write_number(*n);
                Ok(())
            }
            Value::BigInt(int) => {
                self.write_bigint(int);
                Ok(())
            }
            Value::Str(s) => {
                self.writer.u8(BinaryToken::String as u8);
                self.write_string(s)
            }
            Value::External(_) => self.handle_unsupported(value),
            reference => self.write_reference(reference),
        }
    }

    /// Encodes a reference-typed value: a back-reference if it was visited
    /// before, otherwise a fresh slot registration followed by its body.
    fn write_reference(&mut self, value: &Value) -> Result<(), SerializerError> {
        // Safe: parse() routes every non-primitive, non-External variant here.
        let key = match value.ref_id() {
            Some(key) => key,
            None => return self.handle_unsupported(value),
        };
        if let Some(&id) = self.object_ids.get(&key) {
            self.writer.u8u32(BinaryToken::ObjectReference as u8, id);
            return Ok(());
        }
        self.object_ids.insert(key, self.object_ids.len() as u32);

        match value {
            Value::Array(items) => {
                let items = items.borrow();
                if items.is_empty() {
                    self.writer.u8(BinaryToken::EmptyArray as u8);
                    return Ok(());
                }
                self.writer.u8(BinaryToken::Array as u8);
                for element in items.iter() {
                    match element {
                        ArrayElement::Hole => self.writer.u8(BinaryToken::Hole as u8),
                        ArrayElement::Value(v) => self.parse(v)?,
                    }
                }
                self.writer.u8(NULL_TERMINATOR);
            }
            Value::Object(entries) => {
                let entries = entries.borrow();
                if entries.is_empty() {
                    self.writer.u8(BinaryToken::EmptyObject as u8);
                    return Ok(());
                }
                self.writer.u8(BinaryToken::Object as u8);
                for (key, entry_value) in entries.iter() {
                    match key {
                        ObjectKey::Str(s) => {
                            self.writer.u8(BinaryToken::String as u8);
                            self.write_string(s)?;
                        }
                        ObjectKey::Num(n) => self.write_number(*n),
                    }
                    self.parse(entry_value)?;
                }
                self.writer.u8(NULL_TERMINATOR);
            }
            Value::Map(entries) => {
                let entries = entries.borrow();
                if entries.is_empty() {
                    self.writer.u8(BinaryToken::EmptyMap as u8);
                    return Ok(());
                }
                self.writer.u8(BinaryToken::Map as u8);
                for (entry_key, entry_value) in entries.iter() {
                    self.parse(entry_key)?;
                    self.parse(entry_value)?;
                }
                self.writer.u8(NULL_TERMINATOR);
            }
            Value::Set(items) => {
                let items = items.borrow();
                if items.is_empty() {
                    self.writer.u8(BinaryToken::EmptySet as u8);
                    return Ok(());
                }
                self.writer.u8(BinaryToken::Set as u8);
                for item in items.iter() {
                    self.parse(item)?;
                }
                self.writer.u8(NULL_TERMINATOR);
            }
            Value::Date(date) => {
                self.writer.u8f64(BinaryToken::Date as u8, date.epoch_ms);
            }
            Value::RegExp(regexp) => {
                self.writer.u8(BinaryToken::RegExp as u8);
                self.write_string(&regexp.source)?;
                self.writer.u8(regexp.flags);
            }
            Value::BooleanObject(b) => {
                self.writer.u8(BinaryToken::BooleanObject as u8);
                self.writer.u8(**b as u8);
            }
            Value::NumberObject(n) => {
                self.writer.u8f64(BinaryToken::NumberObject as u8, **n);
            }
            Value::StringObject(s) => {
                self.writer.u8(BinaryToken::StringObject as u8);
                self.write_string(s)?;
            }
            Value::ArrayBuffer(bytes) => {
                let bytes = bytes.borrow();
                self.writer
                    .u8u32(BinaryToken::ArrayBuffer as u8, bytes.len() as u32);
                self.writer.buf(&bytes);
            }
            Value::TypedArray(view) => {
                self.writer
                    .u8u32(view.kind.token() as u8, view.bytes.len() as u32);
                self.writer.buf(&view.bytes);
            }
            Value::WeakMap(_) => self.writer.u8(BinaryToken::WeakMap as u8),
            Value::WeakSet(_) => self.writer.u8(BinaryToken::WeakSet as u8),
            _ => unreachable!("primitive routed into write_reference"),
        }
        Ok(())
    }

    /// Picks the narrowest exact wire form: byte, int32, then float64, each
    /// with a sign token so the magnitude is stored unsigned. NaN fails the
    /// `>= 0` test and takes the negative float branch with a negated
    /// payload; decoding negates again, round-tripping it.
    fn write_number(&mut self, value: f64) {
        if value.fract() == 0.0 {
            if (-MAX_BYTE..=MAX_BYTE).contains(&value) {
                if value >= 0.0 {
                    self.writer.u8(BinaryToken::PByte as u8);
                    self.writer.u8(value as u8);
                } else {
                    self.writer.u8(BinaryToken::NByte as u8);
                    self.writer.u8(-value as u8);
                }
                return;
            }
            if (MIN_INT32..=MAX_INT32).contains(&value) {
                if value >= 0.0 {
                    self.writer.u8u32(BinaryToken::PInt32 as u8, value as u32);
                } else {
                    self.writer.u8u32(BinaryToken::NInt32 as u8, -value as u32);
                }
                return;
            }
        }
        if value >= 0.0 {
            self.writer.u8f64(BinaryToken::PFloat64 as u8, value);
        } else {
            self.writer.u8f64(BinaryToken::NFloat64 as u8, -value);
        }
    }

    /// Sign token, 4-byte magnitude byte count, then base-256 little-endian
    /// digit bytes. Zero encodes as a positive BigInt with zero digits.
    fn write_bigint(&mut self, int: &num_bigint::BigInt) {
        let (sign, digits) = int.to_bytes_le();
        let token = if sign == Sign::Minus {
            BinaryToken::NBigInt
        } else {
            BinaryToken::PBigInt
        };
        if sign == Sign::NoSign {
            self.writer.u8u32(token as u8, 0);
        } else {
            self.writer.u8u32(token as u8, digits.len() as u32);
            self.writer.buf(&digits);
        }
    }

    /// UTF-8 bytes followed by the terminator. The terminator is never
    /// escaped, so a string containing 0x00 cannot be represented.
    fn write_string(&mut self, s: &str) -> Result<(), SerializerError> {
        let bytes = s.as_bytes();
        if bytes.contains(&NULL_TERMINATOR) {
            return Err(SerializerError::UnexpectedNullValue);
        }
        self.writer.buf(bytes);
        self.writer.u8(NULL_TERMINATOR);
        Ok(())
    }

    /// One level of substitution: while a hook invocation is being encoded,
    /// another unsupported value aborts the whole encode instead of looping.
    fn handle_unsupported(&mut self, value: &Value) -> Result<(), SerializerError> {
        match self.on_unsupported {
            None => Err(SerializerError::UnsupportedType),
            Some(_) if self.handling_unsupported => {
                Err(SerializerError::UnsupportedSerializedType)
            }
            Some(hook) => {
                let substitute = hook(value);
                self.handling_unsupported = true;
                let result = self.parse(&substitute);
                self.handling_unsupported = false;
                result
            }
        }
    }
}
