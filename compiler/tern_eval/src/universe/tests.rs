#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_zero_path_is_nil() {
    let u = Universe::new();
    let nil = u.value_at(ValuePath::default()).unwrap();
    assert!(nil.is_undefined());
    assert_eq!(
        u.path_for_name(Name::intern("nil")),
        Some(ValuePath::new(Name::intern("nil"), 0, 0))
    );
}

#[test]
fn test_predeclared_types_and_aliases() {
    let u = Universe::new();
    let rune = u.path_for_name(Name::intern("rune")).unwrap();
    let byte = u.path_for_name(Name::intern("byte")).unwrap();
    assert_eq!(u.value_at(rune).unwrap().as_type(), Some(&Type::INT32));
    assert_eq!(u.value_at(byte).unwrap().as_type(), Some(&Type::UINT8));
}

#[test]
fn test_builtins_and_constants() {
    let u = Universe::new();
    let len = u.path_for_name(Name::intern("len")).unwrap();
    assert!(matches!(
        u.value_at(len).unwrap().v,
        Value::Builtin(Builtin::Len)
    ));
    let t = u.path_for_name(Name::intern("true")).unwrap();
    assert_eq!(u.value_at(t).unwrap().as_bool(), Some(true));
    assert_eq!(u.path_for_name(Name::intern("print")), None);
}

#[test]
fn test_only_depth_zero_resolves() {
    let u = Universe::new();
    let path = ValuePath::new(Name::intern("int"), 1, 3);
    assert_eq!(u.value_at(path).unwrap_err(), ScopeError::InvalidPath { path });
    let beyond = ValuePath::new(Name::intern("x"), 0, 999);
    assert!(u.value_at(beyond).is_err());
}
