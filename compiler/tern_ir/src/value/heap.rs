//! Heap-resident structured values.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use tern_realm::ObjectInfo;

use super::{ArrayRef, TypedValue, Value};
use crate::ValueError;

#[derive(Debug, Clone)]
pub struct ArrayValue {
    info: ObjectInfo,
    pub elems: Vec<TypedValue>,
}

impl ArrayValue {
    pub fn new(elems: Vec<TypedValue>) -> Self {
        ArrayValue {
            info: ObjectInfo::new(),
            elems,
        }
    }
}

impl_object!(ArrayValue, "array");

#[derive(Debug, Clone)]
pub struct StructValue {
    info: ObjectInfo,
    pub fields: Vec<TypedValue>,
}

impl StructValue {
    pub fn new(fields: Vec<TypedValue>) -> Self {
        StructValue {
            info: ObjectInfo::new(),
            fields,
        }
    }
}

impl_object!(StructValue, "struct");

/// A window onto a backing array.
#[derive(Clone)]
pub struct SliceValue {
    pub base: ArrayRef,
    pub offset: usize,
    pub len: usize,
    pub cap: usize,
}

impl SliceValue {
    /// A slice over all of `base`.
    pub fn over(base: ArrayRef) -> Self {
        let len = base.borrow().elems.len();
        SliceValue {
            base,
            offset: 0,
            len,
            cap: len,
        }
    }

    pub fn get(&self, index: usize) -> Option<TypedValue> {
        if index >= self.len {
            return None;
        }
        self.base.borrow().elems.get(self.offset + index).cloned()
    }

    /// Elements in order, sharing their payloads.
    pub fn to_vec(&self) -> Vec<TypedValue> {
        let base = self.base.borrow();
        base.elems
            .iter()
            .skip(self.offset)
            .take(self.len)
            .cloned()
            .collect()
    }
}

impl fmt::Debug for SliceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceValue")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("cap", &self.cap)
            .finish_non_exhaustive()
    }
}

/// Hashable projection of a map key.
///
/// Keys are compared by payload only; composite keys are not supported.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    BigInt(BigInt),
    String(Rc<[u8]>),
}

impl MapKey {
    pub fn from_value(tv: &TypedValue) -> Result<Self, ValueError> {
        Ok(match &tv.v {
            Value::None => MapKey::Nil,
            Value::Bool(b) => MapKey::Bool(*b),
            Value::Int(n) => MapKey::Int(*n),
            Value::Uint(n) => MapKey::Uint(*n),
            Value::BigInt(n) => MapKey::BigInt(BigInt::clone(n)),
            Value::String(s) => MapKey::String(Rc::clone(s)),
            _ => {
                return Err(ValueError::InvalidMapKey {
                    ty: tv
                        .t
                        .as_ref()
                        .map_or_else(|| "untyped".to_owned(), ToString::to_string),
                })
            }
        })
    }
}

/// A map that iterates in insertion order.
#[derive(Debug, Clone)]
pub struct MapValue {
    info: ObjectInfo,
    entries: Vec<(TypedValue, TypedValue)>,
    index: FxHashMap<MapKey, usize>,
}

impl MapValue {
    pub fn new() -> Self {
        MapValue {
            info: ObjectInfo::new(),
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &TypedValue) -> Result<Option<&TypedValue>, ValueError> {
        let key = MapKey::from_value(key)?;
        Ok(self.index.get(&key).map(|&i| &self.entries[i].1))
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(
        &mut self,
        key: TypedValue,
        value: TypedValue,
    ) -> Result<Option<TypedValue>, ValueError> {
        let mk = MapKey::from_value(&key)?;
        if let Some(&i) = self.index.get(&mk) {
            return Ok(Some(std::mem::replace(&mut self.entries[i].1, value)));
        }
        self.index.insert(mk, self.entries.len());
        self.entries.push((key, value));
        Ok(None)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypedValue, &TypedValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl Default for MapValue {
    fn default() -> Self {
        Self::new()
    }
}

impl_object!(MapValue, "map");
