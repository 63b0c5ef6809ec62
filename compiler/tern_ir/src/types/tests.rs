#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn point() -> Type {
    Type::structure(vec![
        FieldType::new(Name::intern("x"), Type::INT),
        FieldType::new(Name::intern("y"), Type::INT),
    ])
}

fn declared(name: &str, base: Type, methods: &[&str]) -> Type {
    let methods = methods
        .iter()
        .map(|m| Method {
            name: Name::intern(m),
            func: TypedValue::UNDEFINED,
        })
        .collect();
    Type::Declared(Rc::new(DeclaredType::new(
        Name::intern(name),
        "tern.land/p/geo",
        base,
        methods,
    )))
}

#[test]
fn test_display_forms() {
    assert_eq!(Type::array(3, Type::INT).to_string(), "[3]int");
    assert_eq!(Type::slice(Type::STRING).to_string(), "[]string");
    assert_eq!(Type::map(Type::STRING, Type::BOOL).to_string(), "map[string]bool");
    assert_eq!(Type::pointer(Type::INT).to_string(), "*int");
    assert_eq!(point().to_string(), "struct{x int; y int}");
    assert_eq!(
        Type::func(
            vec![FieldType::new(Name::EMPTY, Type::INT)],
            vec![FieldType::new(Name::EMPTY, Type::STRING)]
        )
        .to_string(),
        "func(int) string"
    );
    assert_eq!(
        declared("Point", point(), &[]).to_string(),
        "tern.land/p/geo.Point"
    );
}

#[test]
fn test_untyped_defaults() {
    assert_eq!(PrimitiveType::UntypedBigint.default_type(), PrimitiveType::Int);
    assert_eq!(PrimitiveType::UntypedRune.default_type(), PrimitiveType::Int32);
    assert_eq!(PrimitiveType::UntypedString.default_type(), PrimitiveType::String);
    assert_eq!(PrimitiveType::UntypedBool.default_type(), PrimitiveType::Bool);
    assert_eq!(PrimitiveType::Uint8.default_type(), PrimitiveType::Uint8);
    assert!(Type::UNTYPED_RUNE.is_untyped());
    assert!(!Type::INT32.is_untyped());
}

#[test]
fn test_declared_types_compare_by_name() {
    let a = declared("Point", point(), &["Len"]);
    let b = declared("Point", Type::INT, &[]);
    let c = declared("Vec", point(), &["Len"]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.underlying(), &point());
    assert_eq!(a.primitive(), None);
    assert_eq!(declared("Meters", Type::INT, &[]).primitive(), Some(PrimitiveType::Int));
}

#[test]
fn test_member_paths() {
    let x = Name::intern("x");
    let y = Name::intern("y");
    let len = Name::intern("Len");

    assert_eq!(point().path_for_member(y).unwrap(), ValuePath::new(y, 1, 1));

    let named = declared("Point", point(), &["Len"]);
    assert_eq!(named.path_for_member(len).unwrap(), ValuePath::new(len, 1, 0));
    assert_eq!(named.path_for_member(x).unwrap(), ValuePath::new(x, 2, 0));

    // Pointers are looked through once.
    let ptr = Type::pointer(named.clone());
    assert_eq!(ptr.path_for_member(x).unwrap(), ValuePath::new(x, 2, 0));
    let ptr_ptr = Type::pointer(ptr);
    assert!(matches!(
        ptr_ptr.path_for_member(x),
        Err(ValueError::UnknownMember { .. })
    ));

    assert!(Type::INT.path_for_member(x).is_err());
}

#[test]
fn test_method_at_checks_depth() {
    let len = Name::intern("Len");
    let Type::Declared(dt) = declared("Point", point(), &["Len"]) else {
        unreachable!()
    };
    assert_eq!(dt.method_at(ValuePath::new(len, 1, 0)).unwrap().name, len);
    assert_eq!(
        dt.method_at(ValuePath::new(len, 3, 0)).unwrap_err(),
        ValueError::PathDepthTooLarge {
            path: ValuePath::new(len, 3, 0)
        }
    );
    assert!(dt.method_at(ValuePath::new(len, 1, 4)).is_err());
}

#[test]
fn test_interface_satisfaction() {
    let stringer = InterfaceType {
        methods: vec![FieldType::new(
            Name::intern("String"),
            Type::func(vec![], vec![FieldType::new(Name::EMPTY, Type::STRING)]),
        )],
    };
    let with = declared("Label", Type::STRING, &["String"]);
    let without = declared("Count", Type::INT, &[]);
    assert!(with.implements(&stringer));
    assert!(Type::pointer(with).implements(&stringer));
    assert!(!without.implements(&stringer));
    assert!(!Type::STRING.implements(&stringer));
    assert!(Type::INT.implements(&InterfaceType::default()));
}

#[test]
fn test_nilable_kinds() {
    assert!(Type::slice(Type::INT).is_nilable());
    assert!(Type::map(Type::INT, Type::INT).is_nilable());
    assert!(Type::pointer(Type::INT).is_nilable());
    assert!(!Type::array(2, Type::INT).is_nilable());
    assert!(!point().is_nilable());
    assert!(!Type::STRING.is_nilable());
}
