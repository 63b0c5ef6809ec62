//! Per-node annotations left by analysis passes.

use smallvec::SmallVec;

use crate::{Name, Type, TypedValue};

/// Attribute keys. The fixed keys cover what the passes agree on;
/// `Custom` is the open end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrKey {
    Preprocessed,
    Predefined,
    TypeValue,
    TypeOfValue,
    Label,
    Iota,
    Custom(Name),
}

#[derive(Clone, Debug)]
pub enum AttrValue {
    Flag(bool),
    Int(i64),
    Name(Name),
    Type(Type),
    Value(TypedValue),
}

impl AttrValue {
    /// Structural equality, used to detect conflicting re-sets.
    pub fn same_as(&self, other: &AttrValue) -> bool {
        match (self, other) {
            (AttrValue::Flag(a), AttrValue::Flag(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Name(a), AttrValue::Name(b)) => a == b,
            (AttrValue::Type(a), AttrValue::Type(b)) => a == b,
            (AttrValue::Value(a), AttrValue::Value(b)) => a.t == b.t && a.v.identical(&b.v),
            _ => false,
        }
    }
}

/// Attribute table of one node. Nodes rarely carry more than a couple.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    entries: SmallVec<[(AttrKey, AttrValue); 2]>,
}

impl Attributes {
    pub fn get(&self, key: AttrKey) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Set `key`, returning the previous value if there was one.
    pub fn set(&mut self, key: AttrKey, value: AttrValue) -> Option<AttrValue> {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
