//! `Deserializer` — sequential token-dispatch decoder.
//!
//! Variable-length composites register an empty shell in the object ID
//! table before their children are read, mirroring the encoder's
//! register-before-recurse ordering, so a child holding a back-reference to
//! its own (still unfinished) parent resolves correctly.

use std::cell::RefCell;
use std::rc::Rc;

use binarytf_buffers::Reader;
use num_bigint::{BigInt, Sign};

use crate::error::DeserializerError;
use crate::tokens::{BinaryToken, NULL_TERMINATOR};
use crate::value::{
    ArrayElement, DateValue, ObjectKey, RegExpValue, TypedArrayKind, TypedArrayValue, Value,
    WeakMapValue, WeakSetValue,
};

pub struct Deserializer<'a> {
    reader: Reader<'a>,
    object_ids: Vec<Value>,
}

impl<'a> Deserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::at_offset(data, 0)
    }

    /// Starts decoding at `offset`, enabling sequential decoding of several
    /// independently serialized values in one buffer.
    pub fn at_offset(data: &'a [u8], offset: usize) -> Self {
        Self {
            reader: Reader::from_slice(data, offset, data.len()),
            object_ids: Vec::new(),
        }
    }

    /// Byte position immediately after the consumed input.
    pub fn offset(&self) -> usize {
        self.reader.x
    }

    /// Whether the cursor sits exactly at the end of the buffer.
    pub fn finished(&self) -> bool {
        self.reader.x == self.reader.end
    }

    /// Reads one value. The terminator byte and the Hole token are not
    /// values, so either of them here is an unknown-type error.
    pub fn read(&mut self) -> Result<Value, DeserializerError> {
        let byte = self.reader.try_u8()?;
        let token = match BinaryToken::from_u8(byte) {
            Some(token) => token,
            None => return Err(DeserializerError::UnknownType(byte)),
        };
        match token {
            BinaryToken::Null => Ok(Value::Null),
            BinaryToken::Undefined => Ok(Value::Undefined),
            BinaryToken::Boolean => Ok(Value::Bool(self.reader.try_u8()? != 0)),
            BinaryToken::PBigInt => self.read_bigint(Sign::Plus),
            BinaryToken::NBigInt => self.read_bigint(Sign::Minus),
            BinaryToken::String => Ok(Value::Str(self.read_string()?)),
            BinaryToken::PByte => Ok(Value::Number(self.reader.try_u8()? as f64)),
            BinaryToken::NByte => Ok(Value::Number(-(self.reader.try_u8()? as f64))),
            BinaryToken::PInt32 => Ok(Value::Number(self.reader.try_u32()? as f64)),
            BinaryToken::NInt32 => Ok(Value::Number(-(self.reader.try_u32()? as f64))),
            BinaryToken::PFloat64 => Ok(Value::Number(self.reader.try_f64()?)),
            BinaryToken::NFloat64 => Ok(Value::Number(-self.reader.try_f64()?)),
            BinaryToken::ObjectReference => {
                let id = self.reader.try_u32()?;
                match self.object_ids.get(id as usize) {
                    Some(value) => Ok(value.clone()),
                    None => Err(DeserializerError::UnknownObjectReference(id)),
                }
            }
            BinaryToken::Array => self.read_array(),
            BinaryToken::EmptyArray => {
                Ok(self.register(Value::Array(Rc::new(RefCell::new(Vec::new())))))
            }
            BinaryToken::Object => self.read_object(),
            BinaryToken::EmptyObject => {
                Ok(self.register(Value::Object(Rc::new(RefCell::new(Vec::new())))))
            }
            BinaryToken::Map => self.read_map(),
            BinaryToken::EmptyMap => {
                Ok(self.register(Value::Map(Rc::new(RefCell::new(Vec::new())))))
            }
            BinaryToken::Set => self.read_set(),
            BinaryToken::EmptySet => {
                Ok(self.register(Value::Set(Rc::new(RefCell::new(Vec::new())))))
            }
            BinaryToken::Date => {
                let epoch_ms = self.reader.try_f64()?;
                Ok(self.register(Value::Date(Rc::new(DateValue { epoch_ms }))))
            }
            BinaryToken::BooleanObject => {
                let value = self.reader.try_u8()? != 0;
                Ok(self.register(Value::BooleanObject(Rc::new(value))))
            }
            BinaryToken::NumberObject => {
                let value = self.reader.try_f64()?;
                Ok(self.register(Value::NumberObject(Rc::new(value))))
            }
            BinaryToken::StringObject => {
                let value = self.read_string()?;
                Ok(self.register(Value::StringObject(Rc::new(value))))
            }
            BinaryToken::RegExp => {
                let source = self.read_string()?;
                let flags = self.reader.try_u8()?;
                Ok(self.register(Value::RegExp(Rc::new(RegExpValue { source, flags }))))
            }
            BinaryToken::ArrayBuffer => {
                let length = self.reader.try_u32()? as usize;
                let bytes = self.reader.try_buf(length)?.to_vec();
                Ok(self.register(Value::ArrayBuffer(Rc::new(RefCell::new(bytes)))))
            }
            BinaryToken::WeakMap => Ok(self.register(Value::WeakMap(Rc::new(WeakMapValue)))),
            BinaryToken::WeakSet => Ok(self.register(Value::WeakSet(Rc::new(WeakSetValue)))),
            BinaryToken::Int8Array
            | BinaryToken::Uint8Array
            | BinaryToken::Uint8ClampedArray
            | BinaryToken::Int16Array
            | BinaryToken::Uint16Array
            | BinaryToken::Int32Array
            | BinaryToken::Uint32Array
            | BinaryToken::Float32Array
            | BinaryToken::Float64Array
            | BinaryToken::DataView => self.read_typed_array(token),
            // NullPointer and Hole are structure, not values.
            BinaryToken::NullPointer | BinaryToken::Hole => {
                Err(DeserializerError::UnknownType(byte))
            }
        }
    }

    /// Registers a freshly constructed composite at the next slot, mirroring
    /// the encoder's first-visit numbering.
    fn register(&mut self, value: Value) -> Value {
        self.object_ids.push(value.clone());
        value
    }

    /// Consumes the terminator if it is next. At end-of-buffer the composite
    /// is truncated, which is an end-of-buffer error rather than a distinct
    /// missing-terminator kind.
    fn read_null_terminator(&mut self) -> Result<bool, DeserializerError> {
        let byte = self.reader.try_peek()?;
        if byte == NULL_TERMINATOR {
            self.reader.skip(1);
            return Ok(true);
        }
        Ok(false)
    }

    fn read_array(&mut self) -> Result<Value, DeserializerError> {
        let items = Rc::new(RefCell::new(Vec::new()));
        let value = self.register(Value::Array(items.clone()));
        while !self.read_null_terminator()? {
            // Hole is checked before general value dispatch; every position
            // up to the terminator counts toward the decoded length.
            if self.reader.try_peek()? == BinaryToken::Hole as u8 {
                self.reader.skip(1);
                items.borrow_mut().push(ArrayElement::Hole);
            } else {
                let element = self.read()?;
                items.borrow_mut().push(ArrayElement::Value(element));
            }
        }
        Ok(value)
    }

    fn read_object(&mut self) -> Result<Value, DeserializerError> {
        let entries = Rc::new(RefCell::new(Vec::new()));
        let value = self.register(Value::Object(entries.clone()));
        while !self.read_null_terminator()? {
            let key_byte = self.reader.try_peek()?;
            let key = match self.read()? {
                Value::Str(s) => ObjectKey::Str(s),
                Value::Number(n) => ObjectKey::Num(n),
                _ => return Err(DeserializerError::UnknownType(key_byte)),
            };
            let entry_value = self.read()?;
            entries.borrow_mut().push((key, entry_value));
        }
        Ok(value)
    }

    fn read_map(&mut self) -> Result<Value, DeserializerError> {
        let entries = Rc::new(RefCell::new(Vec::new()));
        let value = self.register(Value::Map(entries.clone()));
        while !self.read_null_terminator()? {
            let entry_key = self.read()?;
            let entry_value = self.read()?;
            entries.borrow_mut().push((entry_key, entry_value));
        }
        Ok(value)
    }

    fn read_set(&mut self) -> Result<Value, DeserializerError> {
        let items = Rc::new(RefCell::new(Vec::new()));
        let value = self.register(Value::Set(items.clone()));
        while !self.read_null_terminator()? {
            let item = self.read()?;
            items.borrow_mut().push(item);
        }
        Ok(value)
    }

    fn read_typed_array(&mut self, token: BinaryToken) -> Result<Value, DeserializerError> {
        // from_token covers every token routed here.
        let kind = TypedArrayKind::from_token(token)
            .ok_or(DeserializerError::UnknownType(token as u8))?;
        let byte_length = self.reader.try_u32()? as usize;
        let bytes = self.reader.try_buf(byte_length)?.to_vec();
        Ok(self.register(Value::TypedArray(Rc::new(TypedArrayValue { kind, bytes }))))
    }

    /// Bytes up to the terminator, decoded lossily (invalid UTF-8 becomes
    /// U+FFFD, matching the upstream TextDecoder).
    fn read_string(&mut self) -> Result<String, DeserializerError> {
        let bytes = self.reader.try_scan(NULL_TERMINATOR)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_bigint(&mut self, sign: Sign) -> Result<Value, DeserializerError> {
        let length = self.reader.try_u32()? as usize;
        let digits = self.reader.try_buf(length)?;
        let magnitude = BigInt::from_bytes_le(Sign::Plus, digits);
        let value = if sign == Sign::Minus {
            -magnitude
        } else {
            magnitude
        };
        Ok(Value::BigInt(value))
    }
}
