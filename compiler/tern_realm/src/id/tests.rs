use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn realm_from(seed: u8) -> RealmId {
    let mut bytes = [0u8; HASH_SIZE];
    bytes[HASH_SIZE - 1] = seed;
    RealmId::from_bytes(bytes)
}

#[test]
fn test_zero_id_is_zero() {
    assert!(ObjectId::default().is_zero());
    assert!(ObjectId::ZERO.is_zero());
    assert_eq!(ObjectId::ZERO.bytes(), [0u8; OBJECT_ID_SIZE]);
}

#[test]
fn test_bytes_layout() {
    let id = ObjectId::new(realm_from(7), 0x0102_0304_0506_0708);
    let bz = id.bytes();
    assert_eq!(bz.len(), OBJECT_ID_SIZE);
    assert_eq!(bz[HASH_SIZE - 1], 7);
    assert_eq!(&bz[HASH_SIZE..], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_from_bytes_rejects_bad_length() {
    assert_eq!(
        ObjectId::from_bytes(&[0u8; 10]),
        Err(RealmError::InvalidIdLength {
            expected: OBJECT_ID_SIZE,
            got: 10,
        })
    );
}

#[test]
fn test_realm_from_path_is_stable() {
    let a = RealmId::from_path("tern.land/r/demo/boards");
    let b = RealmId::from_path("tern.land/r/demo/boards");
    let c = RealmId::from_path("tern.land/r/demo/users");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(!a.is_zero());
}

#[test]
fn test_display() {
    let id = ObjectId::new(realm_from(1), 42);
    let shown = id.to_string();
    assert!(shown.ends_with("01:42"), "unexpected rendering {shown}");
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "zero realm")]
fn test_zero_realm_with_ordinal_is_rejected_in_debug() {
    let bad = ObjectId::new(RealmId::ZERO, 3);
    let _ = bad.is_zero();
}

proptest! {
    #[test]
    fn object_id_round_trips(realm in any::<[u8; HASH_SIZE]>(), ordinal in any::<u64>()) {
        prop_assume!(realm != [0u8; HASH_SIZE]);
        let id = ObjectId::new(RealmId::from_bytes(realm), ordinal);
        let bz = id.bytes();
        prop_assert_eq!(&bz[..HASH_SIZE], &realm[..]);
        let mut ord = [0u8; 8];
        ord.copy_from_slice(&bz[HASH_SIZE..]);
        prop_assert_eq!(u64::from_be_bytes(ord), ordinal);
        prop_assert_eq!(ObjectId::from_bytes(&bz), Ok(id));
    }

    #[test]
    fn non_zero_realm_is_never_zero(realm in any::<[u8; HASH_SIZE]>(), ordinal in any::<u64>()) {
        prop_assume!(realm != [0u8; HASH_SIZE]);
        prop_assert!(!ObjectId::new(RealmId::from_bytes(realm), ordinal).is_zero());
    }

    #[test]
    fn byte_order_matches_id_order(a in any::<u64>(), b in any::<u64>()) {
        let x = ObjectId::new(realm_from(9), a);
        let y = ObjectId::new(realm_from(9), b);
        prop_assert_eq!(x.cmp(&y), x.bytes().cmp(&y.bytes()));
    }
}
