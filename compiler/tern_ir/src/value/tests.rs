#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::literal::{parse_int, unquote_char, unquote_string};
use super::*;
use crate::{LitKind, Name, ValueError, ValuePath};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_parse_int_bases() {
    assert_eq!(parse_int("42").unwrap(), BigInt::from(42));
    assert_eq!(parse_int("0").unwrap(), BigInt::from(0));
    assert_eq!(parse_int("0x_ff").unwrap(), BigInt::from(255));
    assert_eq!(parse_int("0o17").unwrap(), BigInt::from(15));
    assert_eq!(parse_int("017").unwrap(), BigInt::from(15));
    assert_eq!(parse_int("0b101").unwrap(), BigInt::from(5));
    assert_eq!(parse_int("1_000_000").unwrap(), BigInt::from(1_000_000));
    assert_eq!(
        parse_int("123456789012345678901234567890").unwrap().to_string(),
        "123456789012345678901234567890"
    );
}

#[test]
fn test_parse_int_rejects_garbage() {
    assert!(matches!(
        parse_int("0x"),
        Err(ValueError::MalformedLiteral {
            kind: LitKind::Int,
            ..
        })
    ));
    assert!(parse_int("08").is_err());
    assert!(parse_int("12a").is_err());
    assert!(parse_int("0x-1").is_err());
}

#[test]
fn test_unquote_string() {
    assert_eq!(unquote_string("\"abc\"").unwrap(), b"abc");
    assert_eq!(unquote_string(r#""a\tb\n""#).unwrap(), b"a\tb\n");
    assert_eq!(unquote_string(r#""\"q\"""#).unwrap(), b"\"q\"");
    assert_eq!(unquote_string(r#""é\x41\101""#).unwrap(), "éAA".as_bytes());
    assert_eq!(unquote_string("`raw\\n`").unwrap(), b"raw\\n");
    assert_eq!(unquote_string("\"héllo\"").unwrap(), "héllo".as_bytes());
}

#[test]
fn test_unquote_string_keeps_raw_bytes() {
    assert_eq!(unquote_string(r#""\xff""#).unwrap(), vec![0xff]);
    assert_eq!(
        unquote_string(r#""a\377\xc3""#).unwrap(),
        vec![b'a', 0xff, 0xc3]
    );
    assert_eq!(Value::bytes(&[0xff, b'a']).to_string(), r#""\xffa""#);
}

#[test]
fn test_unquote_string_errors() {
    assert!(unquote_string("abc").is_err());
    assert!(unquote_string("\"").is_err());
    assert!(unquote_string(r#""\q""#).is_err());
    assert!(unquote_string(r#""\'""#).is_err());
    assert!(unquote_string(r#""\x4""#).is_err());
}

#[test]
fn test_unquote_char() {
    assert_eq!(unquote_char("'a'").unwrap(), 97);
    assert_eq!(unquote_char(r"'\n'").unwrap(), 10);
    assert_eq!(unquote_char(r"'\''").unwrap(), 39);
    assert_eq!(unquote_char(r"'\xff'").unwrap(), 255);
    assert_eq!(unquote_char("'世'").unwrap(), 0x4e16);
    assert!(unquote_char("''").is_err());
    assert!(unquote_char("'ab'").is_err());
}

#[test]
fn test_zero_values() {
    assert_eq!(TypedValue::zero(&Type::INT).v.to_string(), "0");
    assert_eq!(TypedValue::zero(&Type::STRING).v.to_string(), "\"\"");
    assert_eq!(TypedValue::zero(&Type::BOOL).v.to_string(), "false");
    assert!(TypedValue::zero(&Type::slice(Type::INT)).v.is_none());
    let arr = TypedValue::zero(&Type::array(3, Type::INT));
    assert_eq!(arr.v.to_string(), "[0 0 0]");
    assert_eq!(arr.t, Some(Type::array(3, Type::INT)));
}

#[test]
fn test_undefined() {
    assert!(TypedValue::UNDEFINED.is_undefined());
    assert!(!TypedValue::of_type(Type::INT).is_undefined());
    assert_eq!(TypedValue::UNDEFINED.to_string(), "<undefined>");
}

#[test]
fn test_copy_duplicates_arrays_and_structs() {
    let original = TypedValue::new(
        Type::array(2, Type::INT),
        Value::array(vec![TypedValue::int(1), TypedValue::int(2)]),
    );
    let copy = original.copy();
    let (Value::Array(a), Value::Array(b)) = (&original.v, &copy.v) else {
        panic!("expected arrays");
    };
    assert!(!a.ptr_eq(b));
    b.borrow_mut().elems[0] = TypedValue::int(9);
    assert_eq!(original.v.to_string(), "[1 2]");
    assert_eq!(copy.v.to_string(), "[9 2]");
}

#[test]
fn test_copy_shares_maps() {
    let m = TypedValue::new(Type::map(Type::STRING, Type::INT), Value::map());
    let copy = m.copy();
    let (Value::Map(a), Value::Map(b)) = (&m.v, &copy.v) else {
        panic!("expected maps");
    };
    assert!(a.ptr_eq(b));
}

#[test]
fn test_map_keeps_insertion_order() {
    let mut m = MapValue::new();
    for k in ["b", "a", "c"] {
        m.insert(TypedValue::string(k), TypedValue::int(1)).unwrap();
    }
    let old = m
        .insert(TypedValue::string("a"), TypedValue::int(2))
        .unwrap();
    assert_eq!(old.unwrap().v.to_string(), "1");
    let keys: Vec<String> = m.iter().map(|(k, _)| k.v.to_string()).collect();
    assert_eq!(keys, ["\"b\"", "\"a\"", "\"c\""]);
    assert_eq!(
        m.get(&TypedValue::string("a")).unwrap().unwrap().v.to_string(),
        "2"
    );
    assert!(m.get(&TypedValue::string("z")).unwrap().is_none());
}

#[test]
fn test_map_rejects_composite_keys() {
    let mut m = MapValue::new();
    let key = TypedValue::new(Type::array(0, Type::INT), Value::array(vec![]));
    assert!(matches!(
        m.insert(key, TypedValue::int(1)),
        Err(ValueError::InvalidMapKey { .. })
    ));
}

fn chain() -> (BlockRef, BlockRef) {
    let outer = ObjectCell::new(Block::with_values(
        None,
        vec![TypedValue::int(10), TypedValue::int(11)],
        None,
    ));
    let inner = ObjectCell::new(Block::with_values(
        None,
        vec![TypedValue::int(20)],
        Some(outer.clone()),
    ));
    (outer, inner)
}

#[test]
fn test_slot_resolution() {
    let (outer, inner) = chain();
    let x = Name::intern("x");
    let local = SlotRef::resolve(&inner, ValuePath::new(x, 1, 0)).unwrap();
    assert_eq!(local.get().v.to_string(), "20");
    let up = SlotRef::resolve(&inner, ValuePath::new(x, 2, 1)).unwrap();
    assert!(up.block.ptr_eq(&outer));
    assert_eq!(up.get().v.to_string(), "11");

    let old = up.set(TypedValue::int(12));
    assert_eq!(old.v.to_string(), "11");
    assert_eq!(outer.borrow().get(1).unwrap().v.to_string(), "12");
}

#[test]
fn test_slot_resolution_errors() {
    let (_outer, inner) = chain();
    let x = Name::intern("x");
    for path in [
        ValuePath::new(x, 0, 1),
        ValuePath::new(x, 3, 0),
        ValuePath::new(x, 1, 5),
    ] {
        assert_eq!(
            SlotRef::resolve(&inner, path).unwrap_err(),
            crate::ScopeError::InvalidPath { path }
        );
    }
}

#[test]
fn test_pointer_store_and_load() {
    let s = StructValue::new(vec![TypedValue::int(1), TypedValue::string("a")]);
    let target = ObjectCell::new(s);
    let p = PointerValue::Field {
        target: target.clone(),
        index: 1,
    };
    let old = p.store(TypedValue::string("b")).unwrap();
    assert_eq!(old.v.to_string(), "\"a\"");
    assert_eq!(p.load().v.to_string(), "\"b\"");
    assert!(tern_realm::same_object(&p.container(), &target.as_object()));

    let m = ObjectCell::new(MapValue::new());
    let entry = PointerValue::MapEntry {
        target: m.clone(),
        key: Box::new(TypedValue::string("k")),
    };
    assert!(entry.store(TypedValue::int(3)).unwrap().is_undefined());
    assert_eq!(m.borrow().len(), 1);
}

proptest! {
    #[test]
    fn decimal_ints_parse(n in any::<u64>()) {
        prop_assert_eq!(parse_int(&n.to_string()).unwrap(), BigInt::from(n));
        prop_assert_eq!(parse_int(&format!("{n:#x}")).unwrap(), BigInt::from(n));
    }
}
