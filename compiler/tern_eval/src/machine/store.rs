//! Stores and ownership updates.
//!
//! Every write goes through [`Machine::store`]. The stored value is copied
//! first, so arrays and structs never end up shared between two locations.
//! With a realm attached, the write is then reported: the container gains the
//! new object, loses the old one, and the fresh copy's nested arrays and
//! structs are attached to it in turn.
//!
//! Objects built while evaluating (composite literals, call results) are not
//! tracked until they are stored. An old value nobody registered is skipped
//! rather than decremented.

use tern_ir::{BlockRef, PointerValue, Type, TypedValue, Value};
use tern_realm::{ObjectRef, Realm};
use tern_stack::ensure_sufficient_stack;

use super::Machine;
use crate::{ops, EvalError, EvalResult};

impl Machine<'_> {
    /// Write `tv` to the location `ptr` addresses.
    pub(super) fn store(&mut self, ptr: &PointerValue, tv: TypedValue) -> EvalResult {
        let tv = tv.copy();
        let Some(realm) = self.realm.as_mut() else {
            ptr.store(tv)?;
            return Ok(());
        };
        let new = tv.as_object();
        let old = ptr.store(tv.clone())?;
        let old = old.as_object().filter(is_tracked);
        realm.did_update(&ptr.container(), old.as_ref(), new.as_ref())?;
        attach_children(realm, &tv)
    }

    /// Convert `tv` to the type `target` points at and store it there.
    /// An undefined target is the blank identifier and drops the value.
    pub(super) fn assign(&mut self, target: &TypedValue, tv: TypedValue) -> EvalResult {
        let Value::Pointer(ptr) = &target.v else {
            if target.is_undefined() {
                return Ok(());
            }
            return Err(EvalError::mismatch(format!("cannot assign to {target}")));
        };
        let tv = match target.t.as_ref().map(Type::underlying) {
            Some(Type::Pointer(pt)) => ops::convert(&tv, &pt.elt)?,
            _ => ops::default_typed(&tv)?,
        };
        self.store(ptr, tv)
    }

    /// Current value at `target`; a missing map entry reads as zero.
    pub(super) fn load(&self, target: &TypedValue) -> EvalResult<TypedValue> {
        let Value::Pointer(ptr) = &target.v else {
            return Err(EvalError::mismatch(format!("cannot read through {target}")));
        };
        let tv = ptr.load();
        match (&tv.t, target.t.as_ref().map(Type::underlying)) {
            (None, Some(Type::Pointer(pt))) if tv.v.is_none() && !pt.elt.is_nilable() => {
                Ok(TypedValue::zero(&pt.elt))
            }
            _ => Ok(tv),
        }
    }

    /// Register the objects held by a freshly created block.
    pub(super) fn adopt(&mut self, block: &BlockRef) -> EvalResult {
        let Some(realm) = self.realm.as_mut() else {
            return Ok(());
        };
        let parent = block.as_object();
        let values = block.borrow().values().to_vec();
        for tv in &values {
            if let Some(obj) = tv.as_object() {
                realm.did_update(&parent, None, Some(&obj))?;
            }
            attach_children(realm, tv)?;
        }
        Ok(())
    }
}

fn is_tracked(obj: &ObjectRef) -> bool {
    obj.borrow().object_info().ref_count() > 0
}

/// Attach the nested arrays and structs of a freshly copied value to it.
/// Slices and maps are shared references and are only registered, not
/// walked.
fn attach_children(realm: &mut Realm, tv: &TypedValue) -> EvalResult {
    let (parent, children) = match &tv.v {
        Value::Array(a) => (a.as_object(), a.borrow().elems.clone()),
        Value::Struct(s) => (s.as_object(), s.borrow().fields.clone()),
        _ => return Ok(()),
    };
    for child in &children {
        if let Some(obj) = child.as_object() {
            realm.did_update(&parent, None, Some(&obj))?;
        }
        ensure_sufficient_stack(|| attach_children(realm, child))?;
    }
    Ok(())
}
