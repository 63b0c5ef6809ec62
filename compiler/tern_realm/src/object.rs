//! Per-object ownership metadata.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{ObjectId, RealmError, ValueHash};

/// Type-erased strong handle to a heap object.
pub type ObjectRef = Rc<RefCell<dyn Object>>;

/// Weak back-reference from an object to its owner.
pub type OwnerRef = Weak<RefCell<dyn Object>>;

/// A heap value participating in the ownership tree.
pub trait Object: fmt::Debug + 'static {
    fn object_info(&self) -> &ObjectInfo;

    fn object_info_mut(&mut self) -> &mut ObjectInfo;

    /// Short kind name for diagnostics ("struct", "array", ...).
    fn object_kind(&self) -> &'static str;
}

/// Identity, hash, owner link, reference count and commit flags of an object.
#[derive(Default)]
pub struct ObjectInfo {
    /// Set once the object is real.
    pub id: ObjectId,
    /// Outdated while `is_dirty`.
    pub hash: ValueHash,
    owner: Option<OwnerRef>,
    ref_count: usize,
    is_new_real: bool,
    is_dirty: bool,
    is_deleted: bool,
}

impl ObjectInfo {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    /// The owner, if one is set and still alive.
    pub fn owner(&self) -> Option<ObjectRef> {
        self.owner.as_ref().and_then(Weak::upgrade)
    }

    /// Replace the owner link. Does not check that the tree stays acyclic.
    pub fn set_owner(&mut self, owner: Option<&ObjectRef>) {
        self.owner = owner.map(Rc::downgrade);
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether `obj` is this object's owner.
    pub fn is_owned_by(&self, obj: &ObjectRef) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|w| std::ptr::addr_eq(w.as_ptr(), Rc::as_ptr(obj)))
    }

    /// True once the persistence layer assigned an identity.
    /// New reals are not real yet.
    #[inline]
    pub fn is_real(&self) -> bool {
        !self.id.is_zero()
    }

    pub fn inc_ref_count(&mut self) -> usize {
        self.ref_count += 1;
        self.ref_count
    }

    pub fn dec_ref_count(&mut self) -> Result<usize, RealmError> {
        self.ref_count = self
            .ref_count
            .checked_sub(1)
            .ok_or(RealmError::NegativeRefCount { id: self.id })?;
        Ok(self.ref_count)
    }

    #[inline]
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    #[inline]
    pub fn is_new_real(&self) -> bool {
        self.is_new_real
    }

    pub fn set_is_new_real(&mut self, x: bool) {
        self.is_new_real = x;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_is_dirty(&mut self, x: bool) {
        self.is_dirty = x;
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn set_is_deleted(&mut self, x: bool) {
        self.is_deleted = x;
    }
}

impl Clone for ObjectInfo {
    /// A copied value is a fresh object: no identity, owner, or references.
    fn clone(&self) -> Self {
        ObjectInfo::new()
    }
}

impl fmt::Debug for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInfo")
            .field("id", &self.id)
            .field("owned", &self.is_owned())
            .field("ref_count", &self.ref_count)
            .field("new_real", &self.is_new_real)
            .field("dirty", &self.is_dirty)
            .field("deleted", &self.is_deleted)
            .finish_non_exhaustive()
    }
}

/// Whether two handles point at the same object.
#[inline]
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Typed shared handle to a heap object.
///
/// Wraps `Rc<RefCell<T>>` so every heap object goes through one factory and
/// can be viewed as a type-erased [`ObjectRef`] for ownership updates.
#[repr(transparent)]
pub struct ObjectCell<T: Object>(Rc<RefCell<T>>);

impl<T: Object> ObjectCell<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        ObjectCell(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Type-erased handle to the same object.
    pub fn as_object(&self) -> ObjectRef {
        let obj: ObjectRef = self.0.clone();
        obj
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Object> Clone for ObjectCell<T> {
    #[inline]
    fn clone(&self) -> Self {
        ObjectCell(Rc::clone(&self.0))
    }
}

impl<T: Object> fmt::Debug for ObjectCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => f.debug_tuple("ObjectCell").field(&*inner).finish(),
            Err(_) => f.write_str("ObjectCell(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests;
