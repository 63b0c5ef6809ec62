//! The universe: the depth-0 scope of predeclared identifiers.
//!
//! Built once, read-only afterwards, and shared by reference with every
//! machine. Slot 0 is always untyped nil, so the zero path reads nil.

use rustc_hash::FxHashMap;
use tern_ir::{Builtin, Name, PrimitiveType, ScopeError, Type, TypedValue, Value, ValuePath};

#[derive(Debug)]
pub struct Universe {
    values: Vec<TypedValue>,
    names: Vec<Name>,
    index: FxHashMap<Name, u16>,
}

/// Predeclared type names, in slot order.
const TYPES: &[(&str, PrimitiveType)] = &[
    ("bool", PrimitiveType::Bool),
    ("string", PrimitiveType::String),
    ("int", PrimitiveType::Int),
    ("int8", PrimitiveType::Int8),
    ("int16", PrimitiveType::Int16),
    ("int32", PrimitiveType::Int32),
    ("int64", PrimitiveType::Int64),
    ("uint", PrimitiveType::Uint),
    ("uint8", PrimitiveType::Uint8),
    ("uint16", PrimitiveType::Uint16),
    ("uint32", PrimitiveType::Uint32),
    ("uint64", PrimitiveType::Uint64),
    ("rune", PrimitiveType::Int32),
    ("byte", PrimitiveType::Uint8),
];

impl Universe {
    pub fn new() -> Self {
        let mut u = Universe {
            values: Vec::new(),
            names: Vec::new(),
            index: FxHashMap::default(),
        };
        u.declare("nil", TypedValue::UNDEFINED);
        for &(name, prim) in TYPES {
            u.declare(name, TypedValue::type_value(Type::Primitive(prim)));
        }
        u.declare("true", TypedValue::untyped_bool(true));
        u.declare("false", TypedValue::untyped_bool(false));
        for b in Builtin::ALL {
            u.declare(b.as_str(), TypedValue::new(Type::BUILTIN, Value::Builtin(b)));
        }
        tracing::debug!(names = u.names.len(), "universe built");
        u
    }

    fn declare(&mut self, name: &str, tv: TypedValue) {
        let name = Name::intern(name);
        let index = u16::try_from(self.values.len()).unwrap_or(u16::MAX);
        self.index.insert(name, index);
        self.names.push(name);
        self.values.push(tv);
    }

    /// Depth-0 path of a predeclared name.
    pub fn path_for_name(&self, name: Name) -> Option<ValuePath> {
        self.index
            .get(&name)
            .map(|&index| ValuePath::new(name, 0, index))
    }

    /// Read a depth-0 slot.
    pub fn value_at(&self, path: ValuePath) -> Result<TypedValue, ScopeError> {
        if path.depth != 0 {
            return Err(ScopeError::InvalidPath { path });
        }
        self.values
            .get(usize::from(path.index))
            .cloned()
            .ok_or(ScopeError::InvalidPath { path })
    }

    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
