use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::RealmId;

#[derive(Debug, Default)]
struct Node {
    info: ObjectInfo,
}

impl Object for Node {
    fn object_info(&self) -> &ObjectInfo {
        &self.info
    }

    fn object_info_mut(&mut self) -> &mut ObjectInfo {
        &mut self.info
    }

    fn object_kind(&self) -> &'static str {
        "node"
    }
}

fn node() -> ObjectCell<Node> {
    ObjectCell::new(Node::default())
}

#[test]
fn test_fresh_info_is_unowned_and_not_real() {
    let info = ObjectInfo::new();
    assert!(!info.is_owned());
    assert!(!info.is_real());
    assert!(!info.is_new_real());
    assert!(!info.is_dirty());
    assert!(!info.is_deleted());
    assert_eq!(info.ref_count(), 0);
}

#[test]
fn test_dec_ref_count_below_zero_is_an_error() {
    let mut info = ObjectInfo::new();
    assert_eq!(
        info.dec_ref_count(),
        Err(RealmError::NegativeRefCount { id: ObjectId::ZERO })
    );
    assert_eq!(info.ref_count(), 0);
}

#[test]
fn test_owner_link() {
    let parent = node();
    let other = node();
    let child = node();

    child.borrow_mut().info.set_owner(Some(&parent.as_object()));
    assert!(child.borrow().info.is_owned());
    assert!(child.borrow().info.is_owned_by(&parent.as_object()));
    assert!(!child.borrow().info.is_owned_by(&other.as_object()));

    let owner = child.borrow().info.owner();
    assert!(owner.is_some_and(|o| same_object(&o, &parent.as_object())));

    child.borrow_mut().info.set_owner(None);
    assert!(!child.borrow().info.is_owned());
}

#[test]
fn test_owner_link_does_not_keep_owner_alive() {
    let child = node();
    {
        let parent = node();
        child.borrow_mut().info.set_owner(Some(&parent.as_object()));
    }
    assert!(child.borrow().info.owner().is_none());
}

#[test]
fn test_is_real_follows_id() {
    let mut info = ObjectInfo::new();
    info.id = ObjectId::new(RealmId::from_path("tern.land/r/demo"), 1);
    assert!(info.is_real());
}

#[test]
fn test_clone_is_fresh() {
    let mut info = ObjectInfo::new();
    info.id = ObjectId::new(RealmId::from_path("tern.land/r/demo"), 5);
    info.inc_ref_count();
    info.set_is_dirty(true);
    let copy = info.clone();
    assert!(!copy.is_real());
    assert_eq!(copy.ref_count(), 0);
    assert!(!copy.is_dirty());
}

#[test]
fn test_cell_identity() {
    let a = node();
    let b = a.clone();
    let c = node();
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&c));
    assert!(same_object(&a.as_object(), &b.as_object()));
    assert!(!same_object(&a.as_object(), &c.as_object()));
    assert_eq!(a.as_object().borrow().object_kind(), "node");
}

#[test]
fn test_cell_debug_while_borrowed() {
    let a = node();
    let _guard = a.borrow_mut();
    assert_eq!(format!("{a:?}"), "ObjectCell(<borrowed>)");
}

proptest! {
    #[test]
    fn ref_count_is_symmetric(n in 0usize..64) {
        let mut info = ObjectInfo::new();
        for i in 1..=n {
            prop_assert_eq!(info.inc_ref_count(), i);
        }
        for i in (0..n).rev() {
            prop_assert_eq!(info.dec_ref_count(), Ok(i));
        }
        prop_assert!(info.dec_ref_count().is_err());
    }
}
