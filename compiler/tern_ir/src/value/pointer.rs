//! Addresses of storage locations.

use std::fmt;

use tern_realm::ObjectRef;

use super::{ArrayRef, MapRef, SlotRef, StructRef, TypedValue};
use crate::ValueError;

/// Where a pointer points.
#[derive(Clone)]
pub enum PointerValue {
    /// A variable or heap item.
    Slot(SlotRef),
    Field { target: StructRef, index: usize },
    Elem { target: ArrayRef, index: usize },
    /// A map entry. Only produced as an assignment target.
    MapEntry { target: MapRef, key: Box<TypedValue> },
}

impl PointerValue {
    /// Read the pointee, sharing any heap payload.
    pub fn load(&self) -> TypedValue {
        match self {
            PointerValue::Slot(slot) => slot.get(),
            PointerValue::Field { target, index } => {
                target.borrow().fields.get(*index).cloned().unwrap_or_default()
            }
            PointerValue::Elem { target, index } => {
                target.borrow().elems.get(*index).cloned().unwrap_or_default()
            }
            PointerValue::MapEntry { target, key } => target
                .borrow()
                .get(key)
                .ok()
                .flatten()
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Store `tv`, returning what was there before (undefined for a new map
    /// entry).
    pub fn store(&self, tv: TypedValue) -> Result<TypedValue, ValueError> {
        let old = match self {
            PointerValue::Slot(slot) => slot.set(tv),
            PointerValue::Field { target, index } => {
                replace_at(&mut target.borrow_mut().fields, *index, tv)
            }
            PointerValue::Elem { target, index } => {
                replace_at(&mut target.borrow_mut().elems, *index, tv)
            }
            PointerValue::MapEntry { target, key } => target
                .borrow_mut()
                .insert(TypedValue::clone(key), tv)?
                .unwrap_or_default(),
        };
        Ok(old)
    }

    /// Static type recorded at the pointee, if any.
    pub fn elem_type(&self) -> Option<crate::Type> {
        match self {
            PointerValue::Slot(slot) => slot.ty(),
            _ => self.load().t,
        }
    }

    /// The object whose content changes when storing through this pointer.
    pub fn container(&self) -> ObjectRef {
        match self {
            PointerValue::Slot(slot) => slot.block.as_object(),
            PointerValue::Field { target, .. } => target.as_object(),
            PointerValue::Elem { target, .. } => target.as_object(),
            PointerValue::MapEntry { target, .. } => target.as_object(),
        }
    }

    /// The object this pointer keeps alive: the heap item it addresses, or
    /// the container of the field, element or entry. Pointers to variables
    /// keep nothing alive.
    pub fn target_object(&self) -> Option<ObjectRef> {
        match self {
            PointerValue::Slot(slot) => slot
                .block
                .borrow()
                .is_heap_item()
                .then(|| slot.block.as_object()),
            PointerValue::Field { target, .. } => Some(target.as_object()),
            PointerValue::Elem { target, .. } => Some(target.as_object()),
            PointerValue::MapEntry { target, .. } => Some(target.as_object()),
        }
    }

    /// Pointer equality: same location.
    pub fn same_target(&self, other: &PointerValue) -> bool {
        match (self, other) {
            (PointerValue::Slot(a), PointerValue::Slot(b)) => a.same_slot(b),
            (
                PointerValue::Field { target: a, index: i },
                PointerValue::Field { target: b, index: j },
            ) => a.ptr_eq(b) && i == j,
            (
                PointerValue::Elem { target: a, index: i },
                PointerValue::Elem { target: b, index: j },
            ) => a.ptr_eq(b) && i == j,
            _ => false,
        }
    }
}

fn replace_at(values: &mut [TypedValue], index: usize, tv: TypedValue) -> TypedValue {
    match values.get_mut(index) {
        Some(slot) => std::mem::replace(slot, tv),
        None => TypedValue::UNDEFINED,
    }
}

impl fmt::Debug for PointerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerValue::Slot(slot) => write!(f, "Pointer({slot:?})"),
            PointerValue::Field { index, .. } => write!(f, "Pointer(field #{index})"),
            PointerValue::Elem { index, .. } => write!(f, "Pointer(elem #{index})"),
            PointerValue::MapEntry { key, .. } => write!(f, "Pointer(entry {})", key.v),
        }
    }
}
