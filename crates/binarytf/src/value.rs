//! [`Value`] — the universal value graph type the codec operates over.
//!
//! Primitives are held by value; every reference-typed variant is held
//! behind an `Rc` so that object identity survives a round trip. The four
//! variable-length composites (Array, Object, Map, Set) additionally sit
//! behind a `RefCell`, because decoding registers the empty shell in the
//! object ID table before populating its children — that ordering is what
//! lets a child back-reference its still-being-populated parent.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::tokens::BinaryToken;

/// One position of an array body. A hole is an index with no element,
/// distinct from an index holding `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Hole,
    Value(Value),
}

/// An object key: strings and numbers only, as in the source value model.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    Str(String),
    Num(f64),
}

/// Milliseconds since the Unix epoch, stored as a 64-bit float (NaN marks
/// an invalid date).
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
    pub epoch_ms: f64,
}

/// A regular-expression pattern: source text plus a bitset of flags. The
/// pattern is never compiled; the codec only transports it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegExpValue {
    pub source: String,
    pub flags: u8,
}

impl RegExpValue {
    pub const GLOBAL: u8 = 1 << 0;
    pub const IGNORE_CASE: u8 = 1 << 1;
    pub const MULTILINE: u8 = 1 << 2;
    pub const STICKY: u8 = 1 << 3;
    pub const UNICODE: u8 = 1 << 4;
    pub const DOT_ALL: u8 = 1 << 5;

    pub fn new(source: impl Into<String>, flags: u8) -> Self {
        Self {
            source: source.into(),
            flags,
        }
    }

    /// Renders the flag bitset in the conventional `gimyus` order.
    pub fn flags_to_string(&self) -> String {
        let mut ret = String::new();
        if self.flags & Self::GLOBAL != 0 {
            ret.push('g');
        }
        if self.flags & Self::IGNORE_CASE != 0 {
            ret.push('i');
        }
        if self.flags & Self::MULTILINE != 0 {
            ret.push('m');
        }
        if self.flags & Self::STICKY != 0 {
            ret.push('y');
        }
        if self.flags & Self::UNICODE != 0 {
            ret.push('u');
        }
        if self.flags & Self::DOT_ALL != 0 {
            ret.push('s');
        }
        ret
    }

    /// Parses a `gimyus` flag string into the bitset; unknown characters
    /// are ignored.
    pub fn flags_from_string(flags: &str) -> u8 {
        let mut ret = 0;
        for ch in flags.chars() {
            ret |= match ch {
                'g' => Self::GLOBAL,
                'i' => Self::IGNORE_CASE,
                'm' => Self::MULTILINE,
                'y' => Self::STICKY,
                'u' => Self::UNICODE,
                's' => Self::DOT_ALL,
                _ => 0,
            };
        }
        ret
    }
}

/// The kind of a typed view over a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    DataView,
}

impl TypedArrayKind {
    /// The wire token for this view kind.
    pub fn token(self) -> BinaryToken {
        match self {
            TypedArrayKind::Int8 => BinaryToken::Int8Array,
            TypedArrayKind::Uint8 => BinaryToken::Uint8Array,
            TypedArrayKind::Uint8Clamped => BinaryToken::Uint8ClampedArray,
            TypedArrayKind::Int16 => BinaryToken::Int16Array,
            TypedArrayKind::Uint16 => BinaryToken::Uint16Array,
            TypedArrayKind::Int32 => BinaryToken::Int32Array,
            TypedArrayKind::Uint32 => BinaryToken::Uint32Array,
            TypedArrayKind::Float32 => BinaryToken::Float32Array,
            TypedArrayKind::Float64 => BinaryToken::Float64Array,
            TypedArrayKind::DataView => BinaryToken::DataView,
        }
    }

    /// The view kind for a wire token, or `None` for non-view tokens.
    pub fn from_token(token: BinaryToken) -> Option<Self> {
        Some(match token {
            BinaryToken::Int8Array => TypedArrayKind::Int8,
            BinaryToken::Uint8Array => TypedArrayKind::Uint8,
            BinaryToken::Uint8ClampedArray => TypedArrayKind::Uint8Clamped,
            BinaryToken::Int16Array => TypedArrayKind::Int16,
            BinaryToken::Uint16Array => TypedArrayKind::Uint16,
            BinaryToken::Int32Array => TypedArrayKind::Int32,
            BinaryToken::Uint32Array => TypedArrayKind::Uint32,
            BinaryToken::Float32Array => TypedArrayKind::Float32,
            BinaryToken::Float64Array => TypedArrayKind::Float64,
            BinaryToken::DataView => TypedArrayKind::DataView,
            _ => return None,
        })
    }
}

/// A typed view: its kind and the raw bytes of the region it covers. The
/// wire carries only byte length + contents, so element interpretation is
/// up to the holder.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArrayValue {
    pub kind: TypedArrayKind,
    pub bytes: Vec<u8>,
}

/// Opaque weak-map placeholder. Weak members are unenumerable in the source
/// value model, so nothing crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakMapValue;

/// Opaque weak-set placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakSetValue;

/// A host value outside the serializable taxonomy (a callable, a live
/// computation handle, and so on). Only the caller-installed
/// unsupported-value hook can turn one into something encodable.
#[derive(Clone)]
pub struct ExternalRef(pub Rc<dyn Any>);

impl ExternalRef {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }
}

impl fmt::Debug for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExternalRef(..)")
    }
}

impl PartialEq for ExternalRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Universal value type spanning the whole wire-format taxonomy.
///
/// Equality is structural; comparing graphs that contain cycles does not
/// terminate. Identity (for cycle and sharing detection) is the `Rc`
/// allocation address, see [`Value::ref_id`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    /// Unboxed boolean primitive.
    Bool(bool),
    /// Numbers of all magnitudes; the encoder picks the narrowest wire form.
    Number(f64),
    /// Arbitrary-precision signed integer.
    BigInt(BigInt),
    /// Unboxed UTF-8 string primitive. Must not contain 0x00.
    Str(String),
    /// Dense or holey ordered sequence.
    Array(Rc<RefCell<Vec<ArrayElement>>>),
    /// Ordered key→value mapping with string or numeric keys.
    Object(Rc<RefCell<Vec<(ObjectKey, Value)>>>),
    /// Ordered key→value mapping; any value as key.
    Map(Rc<RefCell<Vec<(Value, Value)>>>),
    /// Ordered collection of values.
    Set(Rc<RefCell<Vec<Value>>>),
    Date(Rc<DateValue>),
    RegExp(Rc<RegExpValue>),
    /// Boxed boolean — a reference-typed wrapper, unlike [`Value::Bool`].
    BooleanObject(Rc<bool>),
    /// Boxed number.
    NumberObject(Rc<f64>),
    /// Boxed string.
    StringObject(Rc<String>),
    /// Raw byte buffer.
    ArrayBuffer(Rc<RefCell<Vec<u8>>>),
    /// Numeric-typed or byte-addressable view over a byte buffer.
    TypedArray(Rc<TypedArrayValue>),
    WeakMap(Rc<WeakMapValue>),
    WeakSet(Rc<WeakSetValue>),
    /// Value outside the taxonomy; encodable only through the hook.
    External(ExternalRef),
}

impl Value {
    /// Identity of a reference-typed value: the address of its `Rc`
    /// allocation. Primitives (and `External`, which is never registered in
    /// the reference table) return `None`.
    pub fn ref_id(&self) -> Option<usize> {
        Some(match self {
            Value::Array(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::Object(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::Map(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::Set(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::Date(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::RegExp(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::BooleanObject(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::NumberObject(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::StringObject(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::ArrayBuffer(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::TypedArray(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::WeakMap(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            Value::WeakSet(rc) => Rc::as_ptr(rc) as *const u8 as usize,
            _ => return None,
        })
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// A dense array (no holes).
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(
            items.into_iter().map(ArrayElement::Value).collect(),
        )))
    }

    /// An array that may contain holes.
    pub fn sparse_array(items: Vec<ArrayElement>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(entries: Vec<(ObjectKey, Value)>) -> Self {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn set(items: Vec<Value>) -> Self {
        Value::Set(Rc::new(RefCell::new(items)))
    }

    pub fn date(epoch_ms: f64) -> Self {
        Value::Date(Rc::new(DateValue { epoch_ms }))
    }

    pub fn regexp(source: impl Into<String>, flags: u8) -> Self {
        Value::RegExp(Rc::new(RegExpValue::new(source, flags)))
    }

    pub fn boolean_object(value: bool) -> Self {
        Value::BooleanObject(Rc::new(value))
    }

    pub fn number_object(value: f64) -> Self {
        Value::NumberObject(Rc::new(value))
    }

    pub fn string_object(value: impl Into<String>) -> Self {
        Value::StringObject(Rc::new(value.into()))
    }

    pub fn array_buffer(bytes: Vec<u8>) -> Self {
        Value::ArrayBuffer(Rc::new(RefCell::new(bytes)))
    }

    pub fn typed_array(kind: TypedArrayKind, bytes: Vec<u8>) -> Self {
        Value::TypedArray(Rc::new(TypedArrayValue { kind, bytes }))
    }

    pub fn weak_map() -> Self {
        Value::WeakMap(Rc::new(WeakMapValue))
    }

    pub fn weak_set() -> Self {
        Value::WeakSet(Rc::new(WeakSetValue))
    }

    pub fn external<T: Any>(value: T) -> Self {
        Value::External(ExternalRef::new(value))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::object(
                obj.into_iter()
                    .map(|(k, v)| (ObjectKey::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
