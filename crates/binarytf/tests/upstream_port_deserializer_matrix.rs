//! Port of the upstream `deserializer.test.ts` matrix: per-kind round
//! trips, identity preservation across cycles and shared references, holey
//! arrays, sequential metadata decoding, and the decode-time error matrix.

use std::cell::RefCell;
use std::rc::Rc;

use binarytf::{
    deserialize, deserialize_at, deserialize_with_metadata, serialize, ArrayElement, BinaryToken,
    DeserializerError, ObjectKey, RegExpValue, TypedArrayKind, Value,
};
use num_bigint::BigInt;

fn roundtrip(value: &Value) -> Value {
    deserialize(&serialize(value).unwrap()).unwrap()
}

#[test]
fn deserialize_null() {
    assert_eq!(roundtrip(&Value::Null), Value::Null);
}

#[test]
fn deserialize_undefined() {
    assert_eq!(roundtrip(&Value::Undefined), Value::Undefined);
}

#[test]
fn deserialize_boolean() {
    assert_eq!(roundtrip(&Value::Bool(false)), Value::Bool(false));
    assert_eq!(roundtrip(&Value::Bool(true)), Value::Bool(true));
}

#[test]
fn deserialize_pbigint() {
    let value = Value::BigInt(BigInt::from(4));
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_nbigint() {
    let value = Value::BigInt(BigInt::from(-4));
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_bigint_zero() {
    let value = Value::BigInt(BigInt::from(0));
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_huge_bigint() {
    let int: BigInt = "-340282366920938463463374607431768211455"
        .parse()
        .unwrap();
    let value = Value::BigInt(int);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_utf8() {
    assert_eq!(roundtrip(&Value::string("Hello")), Value::string("Hello"));
}

#[test]
fn deserialize_utf16() {
    assert_eq!(roundtrip(&Value::string("⭐")), Value::string("⭐"));
}

#[test]
fn deserialize_unsigned_byte() {
    assert_eq!(roundtrip(&Value::Number(24.0)), Value::Number(24.0));
}

#[test]
fn deserialize_signed_byte() {
    assert_eq!(roundtrip(&Value::Number(-24.0)), Value::Number(-24.0));
}

#[test]
fn deserialize_unsigned_int32() {
    assert_eq!(
        roundtrip(&Value::Number(0xffa as f64)),
        Value::Number(0xffa as f64)
    );
}

#[test]
fn deserialize_signed_int32() {
    assert_eq!(
        roundtrip(&Value::Number(-(0xffa as f64))),
        Value::Number(-(0xffa as f64))
    );
}

#[test]
fn deserialize_int32_boundaries() {
    let min = Value::Number(-2147483648.0);
    let max = Value::Number(2147483647.0);
    assert_eq!(roundtrip(&min), min);
    assert_eq!(roundtrip(&max), max);
}

#[test]
fn deserialize_pfloat64() {
    let value = Value::Number(0xffffffffu32 as f64 + 0.1);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_nfloat64() {
    let value = Value::Number(-(0xffffffffu32 as f64) - 0.1);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_nan() {
    match roundtrip(&Value::Number(f64::NAN)) {
        Value::Number(n) => assert!(n.is_nan()),
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn deserialize_infinities() {
    assert_eq!(
        roundtrip(&Value::Number(f64::INFINITY)),
        Value::Number(f64::INFINITY)
    );
    assert_eq!(
        roundtrip(&Value::Number(f64::NEG_INFINITY)),
        Value::Number(f64::NEG_INFINITY)
    );
}

#[test]
fn deserialize_unsafe_float() {
    assert_eq!(roundtrip(&Value::Number(f64::MAX)), Value::Number(f64::MAX));
}

#[test]
fn deserialize_array_empty() {
    assert_eq!(roundtrip(&Value::array(vec![])), Value::array(vec![]));
}

#[test]
fn deserialize_array() {
    let value = Value::array(vec![Value::Number(4.0), Value::string("x"), Value::Null]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_array_holey() {
    let decoded = roundtrip(&Value::sparse_array(vec![ArrayElement::Hole]));
    match decoded {
        Value::Array(items) => {
            let items = items.borrow();
            assert_eq!(items.len(), 1);
            // A hole stays absent, it does not become Null.
            assert_eq!(items[0], ArrayElement::Hole);
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn deserialize_array_trailing_holes_keep_length() {
    let value = Value::sparse_array(vec![
        ArrayElement::Value(Value::Number(1.0)),
        ArrayElement::Hole,
        ArrayElement::Hole,
    ]);
    match roundtrip(&value) {
        Value::Array(items) => {
            let items = items.borrow();
            assert_eq!(items.len(), 3);
            assert_eq!(items[1], ArrayElement::Hole);
            assert_eq!(items[2], ArrayElement::Hole);
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn deserialize_array_circular() {
    let items = Rc::new(RefCell::new(Vec::new()));
    let array = Value::Array(items.clone());
    items.borrow_mut().push(ArrayElement::Value(array.clone()));

    match roundtrip(&array) {
        Value::Array(outer) => {
            let inner = outer.borrow();
            assert_eq!(inner.len(), 1);
            match &inner[0] {
                ArrayElement::Value(Value::Array(child)) => {
                    // Same reference, not a structural copy.
                    assert!(Rc::ptr_eq(&outer, child));
                }
                other => panic!("expected array element, got {other:?}"),
            }
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn deserialize_object_empty() {
    assert_eq!(roundtrip(&Value::object(vec![])), Value::object(vec![]));
}

#[test]
fn deserialize_object() {
    let value = Value::object(vec![
        (ObjectKey::Str("a".into()), Value::Number(12.0)),
        (ObjectKey::Num(2.0), Value::string("two")),
    ]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_object_shared_reference() {
    let shared = Value::array(vec![Value::Number(1.0)]);
    let value = Value::object(vec![
        (ObjectKey::Str("a".into()), shared.clone()),
        (ObjectKey::Str("b".into()), shared),
    ]);
    match roundtrip(&value) {
        Value::Object(entries) => {
            let entries = entries.borrow();
            let (first, second) = match (&entries[0].1, &entries[1].1) {
                (Value::Array(a), Value::Array(b)) => (a.clone(), b.clone()),
                other => panic!("expected two arrays, got {other:?}"),
            };
            assert!(Rc::ptr_eq(&first, &second));
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn deserialize_shared_empty_array_keeps_identity() {
    // Empty composites still consume a reference slot on both sides.
    let shared = Value::array(vec![]);
    let value = Value::array(vec![shared.clone(), shared]);
    match roundtrip(&value) {
        Value::Array(outer) => {
            let outer = outer.borrow();
            match (&outer[0], &outer[1]) {
                (
                    ArrayElement::Value(Value::Array(a)),
                    ArrayElement::Value(Value::Array(b)),
                ) => assert!(Rc::ptr_eq(a, b)),
                other => panic!("expected two arrays, got {other:?}"),
            }
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn deserialize_map() {
    let value = Value::map(vec![
        (Value::Number(1.0), Value::Null),
        (Value::string("k"), Value::Bool(true)),
        (Value::array(vec![]), Value::string("array key")),
    ]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_map_empty() {
    assert_eq!(roundtrip(&Value::map(vec![])), Value::map(vec![]));
}

#[test]
fn deserialize_set() {
    let value = Value::set(vec![Value::Null, Value::Number(5.0), Value::string("s")]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_set_empty() {
    assert_eq!(roundtrip(&Value::set(vec![])), Value::set(vec![]));
}

#[test]
fn deserialize_date() {
    let value = Value::date(1620000000000.0);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_invalid_date() {
    match roundtrip(&Value::date(f64::NAN)) {
        Value::Date(date) => assert!(date.epoch_ms.is_nan()),
        other => panic!("expected date, got {other:?}"),
    }
}

#[test]
fn deserialize_boolean_object() {
    assert_eq!(
        roundtrip(&Value::boolean_object(true)),
        Value::boolean_object(true)
    );
}

#[test]
fn deserialize_number_object() {
    assert_eq!(
        roundtrip(&Value::number_object(12.5)),
        Value::number_object(12.5)
    );
}

#[test]
fn deserialize_string_object() {
    assert_eq!(
        roundtrip(&Value::string_object("Hello")),
        Value::string_object("Hello")
    );
}

#[test]
fn deserialize_regexp() {
    let flags = RegExpValue::flags_from_string("gim");
    let value = Value::regexp("^ab+c$", flags);
    match roundtrip(&value) {
        Value::RegExp(re) => {
            assert_eq!(re.source, "^ab+c$");
            assert_eq!(re.flags_to_string(), "gim");
        }
        other => panic!("expected regexp, got {other:?}"),
    }
}

#[test]
fn deserialize_array_buffer() {
    let value = Value::array_buffer(vec![1, 2, 3, 4]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn deserialize_typed_arrays() {
    let kinds = [
        TypedArrayKind::Int8,
        TypedArrayKind::Uint8,
        TypedArrayKind::Uint8Clamped,
        TypedArrayKind::Int16,
        TypedArrayKind::Uint16,
        TypedArrayKind::Int32,
        TypedArrayKind::Uint32,
        TypedArrayKind::Float32,
        TypedArrayKind::Float64,
        TypedArrayKind::DataView,
    ];
    for kind in kinds {
        let value = Value::typed_array(kind, vec![0xde, 0xad, 0xbe, 0xef]);
        match roundtrip(&value) {
            Value::TypedArray(view) => {
                assert_eq!(view.kind, kind);
                assert_eq!(view.bytes, [0xde, 0xad, 0xbe, 0xef]);
            }
            other => panic!("expected typed array, got {other:?}"),
        }
    }
}

#[test]
fn deserialize_weak_map() {
    assert_eq!(roundtrip(&Value::weak_map()), Value::weak_map());
}

#[test]
fn deserialize_weak_set() {
    assert_eq!(roundtrip(&Value::weak_set()), Value::weak_set());
}

#[test]
fn deserialize_nested_graph() {
    let value = Value::object(vec![
        (
            ObjectKey::Str("list".into()),
            Value::array(vec![
                Value::map(vec![(Value::string("k"), Value::set(vec![Value::Null]))]),
                Value::date(0.0),
            ]),
        ),
        (ObjectKey::Str("buf".into()), Value::array_buffer(vec![7])),
    ]);
    assert_eq!(roundtrip(&value), value);
}

// ---------------------------------------------------------------------------
// deserialize_with_metadata
// ---------------------------------------------------------------------------

#[test]
fn metadata_single_value_consumes_whole_buffer() {
    let data = serialize(&Value::string("Hello")).unwrap();
    let metadata = deserialize_with_metadata(&data, 0).unwrap();
    assert_eq!(metadata.value, Value::string("Hello"));
    assert_eq!(metadata.offset, None);
}

#[test]
fn metadata_chains_through_concatenated_values() {
    let hello = serialize(&Value::string("Hello")).unwrap();
    let world = serialize(&Value::string("World")).unwrap();
    let mut data = hello.clone();
    data.extend_from_slice(&world);

    let first = deserialize_with_metadata(&data, 0).unwrap();
    assert_eq!(first.value, Value::string("Hello"));
    assert_eq!(first.offset, Some(hello.len()));

    let second = deserialize_with_metadata(&data, hello.len()).unwrap();
    assert_eq!(second.value, Value::string("World"));
    assert_eq!(second.offset, None);
}

#[test]
fn deserialize_at_reads_from_offset() {
    let mut data = serialize(&Value::Number(1.0)).unwrap();
    let first_len = data.len();
    data.extend(serialize(&Value::Number(2.0)).unwrap());
    assert_eq!(deserialize_at(&data, first_len).unwrap(), Value::Number(2.0));
}

#[test]
fn metadata_reference_tables_are_call_scoped() {
    // Each decode call numbers slots from zero; a reference in the second
    // value cannot reach into the first value's table.
    let mut data = serialize(&Value::array(vec![Value::Number(1.0)])).unwrap();
    let first_len = data.len();
    data.extend([BinaryToken::ObjectReference as u8, 0, 0, 0, 0]);
    assert_eq!(
        deserialize_at(&data, first_len),
        Err(DeserializerError::UnknownObjectReference(0))
    );
}

// ---------------------------------------------------------------------------
// Error matrix
// ---------------------------------------------------------------------------

#[test]
fn deserialize_empty_buffer_fails() {
    assert_eq!(
        deserialize(&[]),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 1 })
    );
}

#[test]
fn deserialize_truncated_int32_fails() {
    assert_eq!(
        deserialize(&[BinaryToken::PInt32 as u8]),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 4 })
    );
}

#[test]
fn deserialize_truncated_float64_fails() {
    assert_eq!(
        deserialize(&[BinaryToken::PFloat64 as u8, 0, 0]),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 8 })
    );
}

#[test]
fn deserialize_unknown_token_fails() {
    assert_eq!(
        deserialize(&[0xff]),
        Err(DeserializerError::UnknownType(0xff))
    );
}

#[test]
fn deserialize_unterminated_string_fails() {
    assert_eq!(
        deserialize(&[BinaryToken::String as u8, b'h', b'i']),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 1 })
    );
}

#[test]
fn deserialize_unterminated_array_fails() {
    let data = [BinaryToken::Array as u8, BinaryToken::Null as u8];
    assert_eq!(
        deserialize(&data),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 1 })
    );
}

#[test]
fn deserialize_truncated_array_buffer_fails() {
    let data = [BinaryToken::ArrayBuffer as u8, 0, 0, 0, 4, 1, 2];
    assert_eq!(
        deserialize(&data),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 4 })
    );
}

#[test]
fn deserialize_truncated_bigint_fails() {
    let data = [BinaryToken::PBigInt as u8, 0, 0, 0, 2, 9];
    assert_eq!(
        deserialize(&data),
        Err(DeserializerError::UnexpectedEndOfBuffer { expected: 2 })
    );
}
