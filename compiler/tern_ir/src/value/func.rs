//! Callable values.

use std::fmt;

use super::{BlockRef, TypedValue};
use crate::{DeclId, ExprId, Name, Type};

/// Node a function body comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FuncSource {
    Lit(ExprId),
    Decl(DeclId),
}

/// A function closed over the block it was created in.
pub struct FuncValue {
    pub name: Name,
    /// Always a `Type::Func`.
    pub ty: Type,
    pub source: FuncSource,
    pub closure: Option<BlockRef>,
}

impl fmt::Debug for FuncValue {
    // The closure block may hold this very function; never print it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncValue")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// A method value with its receiver already chosen.
#[derive(Debug)]
pub struct BoundMethod {
    pub recv: TypedValue,
    pub func: std::rc::Rc<FuncValue>,
}

/// Functions predeclared in the universe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    Cap,
    Append,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Len, Builtin::Cap, Builtin::Append];

    pub const fn as_str(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Cap => "cap",
            Builtin::Append => "append",
        }
    }
}
