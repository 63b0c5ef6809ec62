use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_intern_and_lookup() {
    let hello = Name::intern("hello");
    let world = Name::intern("world");
    assert_eq!(hello, Name::intern("hello"));
    assert_ne!(hello, world);
    assert_eq!(hello.as_str(), "hello");
    assert_eq!(world.to_string(), "world");
}

#[test]
fn test_pre_interned() {
    assert_eq!(Name::intern(""), Name::EMPTY);
    assert_eq!(Name::intern("_"), Name::BLANK);
    assert!(Name::EMPTY.is_empty());
    assert!(Name::BLANK.is_blank());
    assert!(!Name::intern("x").is_empty());
}

#[test]
fn test_debug_shows_text() {
    assert_eq!(format!("{:?}", Name::intern("abc")), "Name(\"abc\")");
}

proptest! {
    #[test]
    fn interning_is_idempotent(s in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
        let a = Name::intern(&s);
        let b = Name::intern(&s);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.as_str(), s.as_str());
    }
}
