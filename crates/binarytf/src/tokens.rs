//! Wire-format token table.
//!
//! One leading byte identifies the kind of every encoded value. The 0x00
//! byte is reserved as the terminator for strings and variable-length
//! composites, so every value token is strictly greater than it.

/// The reserved terminator byte ending a string or a variable-length
/// composite's child sequence. Never escaped; strings containing it are
/// rejected at encode time.
pub const NULL_TERMINATOR: u8 = 0x00;

/// Leading byte identifying a value's wire-format kind.
///
/// Mirrors the `BinaryTokens` const enum of the upstream TypeScript
/// implementation; discriminants are part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BinaryToken {
    /// Reserved terminator; never a value token.
    NullPointer = 0,
    /// Absent array index. Only legal inside an `Array` body.
    Hole = 1,
    Null = 2,
    PBigInt = 3,
    NBigInt = 4,
    Boolean = 5,
    String = 6,
    Undefined = 7,
    PByte = 8,
    NByte = 9,
    PInt32 = 10,
    NInt32 = 11,
    PFloat64 = 12,
    NFloat64 = 13,
    Array = 14,
    EmptyArray = 15,
    ObjectReference = 16,
    Date = 17,
    BooleanObject = 18,
    NumberObject = 19,
    StringObject = 20,
    EmptyObject = 21,
    Object = 22,
    RegExp = 23,
    Map = 24,
    EmptyMap = 25,
    Set = 26,
    EmptySet = 27,
    ArrayBuffer = 28,
    WeakMap = 29,
    WeakSet = 30,
    Int8Array = 31,
    Uint8Array = 32,
    Uint8ClampedArray = 33,
    Int16Array = 34,
    Uint16Array = 35,
    Int32Array = 36,
    Uint32Array = 37,
    Float32Array = 38,
    Float64Array = 39,
    DataView = 40,
}

impl BinaryToken {
    /// Decodes a leading byte into its token, or `None` for bytes outside
    /// the table.
    pub fn from_u8(byte: u8) -> Option<Self> {
        use BinaryToken::*;
        Some(match byte {
            0 => NullPointer,
            1 => Hole,
            2 => Null,
            3 => PBigInt,
            4 => NBigInt,
            5 => Boolean,
            6 => String,
            7 => Undefined,
            8 => PByte,
            9 => NByte,
            10 => PInt32,
            11 => NInt32,
            12 => PFloat64,
            13 => NFloat64,
            14 => Array,
            15 => EmptyArray,
            16 => ObjectReference,
            17 => Date,
            18 => BooleanObject,
            19 => NumberObject,
            20 => StringObject,
            21 => EmptyObject,
            22 => Object,
            23 => RegExp,
            24 => Map,
            25 => EmptyMap,
            26 => Set,
            27 => EmptySet,
            28 => ArrayBuffer,
            29 => WeakMap,
            30 => WeakSet,
            31 => Int8Array,
            32 => Uint8Array,
            33 => Uint8ClampedArray,
            34 => Int16Array,
            35 => Uint16Array,
            36 => Int32Array,
            37 => Uint32Array,
            38 => Float32Array,
            39 => Float64Array,
            40 => DataView,
            _ => return None,
        })
    }
}
