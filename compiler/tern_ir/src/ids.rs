//! Arena indices.
//!
//! Every node lives in a flat arena inside [`Ast`](crate::Ast) and is
//! referred to by a typed 32-bit index.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for "no node".
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    f.write_str(concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_id!(
    /// Index of an expression (value or type expression).
    ExprId
);
define_id!(
    /// Index of a statement.
    StmtId
);
define_id!(
    /// Index of a declaration.
    DeclId
);
define_id!(FileId);
define_id!(PackageId);
define_id!(
    /// Index of a static block in the scope table.
    ScopeId
);

/// Any node of the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeId {
    Expr(ExprId),
    Stmt(StmtId),
    Decl(DeclId),
    File(FileId),
    Package(PackageId),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Expr(id) => write!(f, "expr#{}", id.raw()),
            NodeId::Stmt(id) => write!(f, "stmt#{}", id.raw()),
            NodeId::Decl(id) => write!(f, "decl#{}", id.raw()),
            NodeId::File(id) => write!(f, "file#{}", id.raw()),
            NodeId::Package(id) => write!(f, "package#{}", id.raw()),
        }
    }
}

impl From<ExprId> for NodeId {
    fn from(id: ExprId) -> Self {
        NodeId::Expr(id)
    }
}

impl From<StmtId> for NodeId {
    fn from(id: StmtId) -> Self {
        NodeId::Stmt(id)
    }
}

impl From<DeclId> for NodeId {
    fn from(id: DeclId) -> Self {
        NodeId::Decl(id)
    }
}

impl From<FileId> for NodeId {
    fn from(id: FileId) -> Self {
        NodeId::File(id)
    }
}

impl From<PackageId> for NodeId {
    fn from(id: PackageId) -> Self {
        NodeId::Package(id)
    }
}

/// Convert an arena length to a `u32` index.
///
/// # Panics
/// Panics if the arena outgrew the 32-bit index space.
#[inline]
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}
