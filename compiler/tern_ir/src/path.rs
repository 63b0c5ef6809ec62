//! Lexical addresses.

use std::fmt;

use crate::Name;

/// Address of a slot relative to the scope it is read from.
///
/// For blocks, `depth` is the number of parent hops plus one; depth 0 is the
/// universe. For values with members, depth 1 addresses struct fields or
/// declared-type methods and depth 2 the fields of a declared type's
/// underlying struct. Embedded structs are flattened, so nothing deeper
/// exists.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ValuePath {
    pub depth: u16,
    pub index: u16,
    /// Carried for diagnostics only.
    pub name: Name,
}

impl ValuePath {
    pub const fn new(name: Name, depth: u16, index: u16) -> Self {
        ValuePath { depth, index, name }
    }

    /// The untyped-nil universe slot.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.depth == 0 && self.index == 0
    }

    #[inline]
    pub const fn is_universe(&self) -> bool {
        self.depth == 0
    }
}

impl fmt::Debug for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValuePath({}@{}:{})", self.name, self.depth, self.index)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{},{}>", self.name, self.depth, self.index)
    }
}
