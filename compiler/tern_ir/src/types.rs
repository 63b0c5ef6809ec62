//! Run-time type representation.
//!
//! Types are first-class values: type expressions evaluate to [`Type`] on the
//! machine stacks. Unnamed types compare structurally, declared types by name
//! and package path.

use std::fmt;
use std::rc::Rc;

use crate::{ChanDir, Name, TypedValue, ValueError, ValuePath};

/// Predeclared and untyped kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    UntypedBool,
    UntypedRune,
    UntypedBigint,
    UntypedString,
    /// The type of type values.
    Type,
    /// The type of `len`, `cap` and `append`.
    Builtin,
}

impl PrimitiveType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::UntypedBool => "untyped bool",
            Self::UntypedRune => "untyped rune",
            Self::UntypedBigint => "untyped bigint",
            Self::UntypedString => "untyped string",
            Self::Type => "type",
            Self::Builtin => "builtin",
        }
    }

    #[inline]
    pub const fn is_untyped(self) -> bool {
        matches!(
            self,
            Self::UntypedBool | Self::UntypedRune | Self::UntypedBigint | Self::UntypedString
        )
    }

    /// Fixed-width signed integers; runes are `int32`.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::UntypedRune
        )
    }

    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned() || matches!(self, Self::UntypedBigint)
    }

    #[inline]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String | Self::UntypedString)
    }

    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool | Self::UntypedBool)
    }

    /// Width in bits of fixed-width integers.
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            Self::Int8 | Self::Uint8 => Some(8),
            Self::Int16 | Self::Uint16 => Some(16),
            Self::Int32 | Self::Uint32 | Self::UntypedRune => Some(32),
            Self::Int | Self::Int64 | Self::Uint | Self::Uint64 => Some(64),
            _ => None,
        }
    }

    /// Type an untyped constant takes when nothing else decides.
    pub const fn default_type(self) -> PrimitiveType {
        match self {
            Self::UntypedBool => Self::Bool,
            Self::UntypedRune => Self::Int32,
            Self::UntypedBigint => Self::Int,
            Self::UntypedString => Self::String,
            other => other,
        }
    }
}

/// A Tern type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Array(Rc<ArrayType>),
    Slice(Rc<SliceType>),
    Map(Rc<MapType>),
    Pointer(Rc<PointerType>),
    Struct(Rc<StructType>),
    Func(Rc<FuncType>),
    Interface(Rc<InterfaceType>),
    Chan(Rc<ChanType>),
    Declared(Rc<DeclaredType>),
}

impl Type {
    pub const BOOL: Type = Type::Primitive(PrimitiveType::Bool);
    pub const STRING: Type = Type::Primitive(PrimitiveType::String);
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const INT32: Type = Type::Primitive(PrimitiveType::Int32);
    pub const INT64: Type = Type::Primitive(PrimitiveType::Int64);
    pub const UINT8: Type = Type::Primitive(PrimitiveType::Uint8);
    pub const UNTYPED_BOOL: Type = Type::Primitive(PrimitiveType::UntypedBool);
    pub const UNTYPED_RUNE: Type = Type::Primitive(PrimitiveType::UntypedRune);
    pub const UNTYPED_BIGINT: Type = Type::Primitive(PrimitiveType::UntypedBigint);
    pub const UNTYPED_STRING: Type = Type::Primitive(PrimitiveType::UntypedString);
    pub const TYPE: Type = Type::Primitive(PrimitiveType::Type);
    pub const BUILTIN: Type = Type::Primitive(PrimitiveType::Builtin);

    pub fn array(len: usize, elt: Type) -> Type {
        Type::Array(Rc::new(ArrayType { len, elt }))
    }

    pub fn slice(elt: Type) -> Type {
        Type::Slice(Rc::new(SliceType {
            elt,
            variadic: false,
        }))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Rc::new(MapType { key, value }))
    }

    pub fn pointer(elt: Type) -> Type {
        Type::Pointer(Rc::new(PointerType { elt }))
    }

    pub fn structure(fields: Vec<FieldType>) -> Type {
        Type::Struct(Rc::new(StructType { fields }))
    }

    pub fn func(params: Vec<FieldType>, results: Vec<FieldType>) -> Type {
        Type::Func(Rc::new(FuncType { params, results }))
    }

    /// The underlying type: declared types resolve to their base.
    pub fn underlying(&self) -> &Type {
        let mut t = self;
        while let Type::Declared(dt) = t {
            t = &dt.base;
        }
        t
    }

    /// The primitive kind of the underlying type, if any.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.underlying() {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    #[inline]
    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.is_untyped())
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        matches!(self.underlying(), Type::Interface(_))
    }

    /// Types whose zero value is nil.
    pub fn is_nilable(&self) -> bool {
        matches!(
            self.underlying(),
            Type::Slice(_)
                | Type::Map(_)
                | Type::Pointer(_)
                | Type::Func(_)
                | Type::Interface(_)
                | Type::Chan(_)
        )
    }

    /// Path of a field or method reachable through a value of this type.
    ///
    /// Pointers are looked through once.
    pub fn path_for_member(&self, name: Name) -> Result<ValuePath, ValueError> {
        let found = match self {
            Type::Declared(dt) => return dt.path_for_name(name),
            Type::Struct(st) => st.path_for_field(name),
            Type::Pointer(pt) if !matches!(pt.elt, Type::Pointer(_)) => {
                return pt.elt.path_for_member(name);
            }
            _ => None,
        };
        found.ok_or_else(|| ValueError::UnknownMember {
            name,
            ty: self.to_string(),
        })
    }

    /// Whether a value of this type has every method of `iface`.
    pub fn implements(&self, iface: &InterfaceType) -> bool {
        let methods: &[Method] = match self {
            Type::Declared(dt) => &dt.methods,
            Type::Pointer(pt) => match &pt.elt {
                Type::Declared(dt) => &dt.methods,
                _ => &[],
            },
            Type::Interface(other) => {
                return iface
                    .methods
                    .iter()
                    .all(|m| other.methods.iter().any(|o| o.name == m.name));
            }
            _ => &[],
        };
        iface
            .methods
            .iter()
            .all(|m| methods.iter().any(|o| o.name == m.name))
    }
}

impl From<PrimitiveType> for Type {
    fn from(p: PrimitiveType) -> Self {
        Type::Primitive(p)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayType {
    pub len: usize,
    pub elt: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceType {
    pub elt: Type,
    /// Trailing `...T` parameter.
    pub variadic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapType {
    pub key: Type,
    pub value: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerType {
    pub elt: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChanType {
    pub dir: ChanDir,
    pub elt: Type,
}

/// A named, typed member: struct field, parameter, result or interface
/// method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldType {
    pub name: Name,
    pub ty: Type,
    pub tag: Option<Rc<[u8]>>,
}

impl FieldType {
    pub fn new(name: Name, ty: Type) -> Self {
        FieldType {
            name,
            ty,
            tag: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StructType {
    pub fields: Vec<FieldType>,
}

impl StructType {
    /// Fields of an unnamed struct sit at depth 1.
    pub fn path_for_field(&self, name: Name) -> Option<ValuePath> {
        self.field_index(name)
            .map(|index| ValuePath::new(name, 1, index))
    }

    pub fn field_index(&self, name: Name) -> Option<u16> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| u16::try_from(i).ok())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FuncType {
    pub params: Vec<FieldType>,
    pub results: Vec<FieldType>,
}

impl FuncType {
    pub fn is_variadic(&self) -> bool {
        self.params
            .last()
            .is_some_and(|p| matches!(&p.ty, Type::Slice(st) if st.variadic))
    }

    /// Whether results are named and so readable by a bare `return`.
    pub fn has_named_results(&self) -> bool {
        self.results.iter().any(|r| !r.name.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct InterfaceType {
    pub methods: Vec<FieldType>,
}

/// Method bound to a declared type.
#[derive(Clone, Debug)]
pub struct Method {
    pub name: Name,
    pub func: TypedValue,
}

/// A named type with an optional method set.
#[derive(Clone, Debug)]
pub struct DeclaredType {
    pub name: Name,
    pub pkg_path: Rc<str>,
    pub base: Type,
    pub methods: Vec<Method>,
}

impl DeclaredType {
    pub fn new(name: Name, pkg_path: &str, base: Type, methods: Vec<Method>) -> Self {
        DeclaredType {
            name,
            pkg_path: Rc::from(pkg_path),
            base,
            methods,
        }
    }

    /// Methods resolve at depth 1; fields of an underlying struct at depth 2.
    pub fn path_for_name(&self, name: Name) -> Result<ValuePath, ValueError> {
        if let Some(i) = self.methods.iter().position(|m| m.name == name) {
            let index = u16::try_from(i).map_err(|_| self.unknown(name))?;
            return Ok(ValuePath::new(name, 1, index));
        }
        if let Type::Struct(st) = self.base.underlying() {
            if let Some(index) = st.field_index(name) {
                return Ok(ValuePath::new(name, 2, index));
            }
        }
        Err(self.unknown(name))
    }

    /// The method addressed by a depth-1 path.
    pub fn method_at(&self, path: ValuePath) -> Result<&Method, ValueError> {
        if path.depth > 2 {
            return Err(ValueError::PathDepthTooLarge { path });
        }
        self.methods
            .get(usize::from(path.index))
            .filter(|_| path.depth == 1)
            .ok_or_else(|| self.unknown(path.name))
    }

    fn unknown(&self, name: Name) -> ValueError {
        ValueError::UnknownMember {
            name,
            ty: self.name.to_string(),
        }
    }
}

impl PartialEq for DeclaredType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.pkg_path == other.pkg_path
    }
}

impl Eq for DeclaredType {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.as_str()),
            Type::Array(at) => write!(f, "[{}]{}", at.len, at.elt),
            Type::Slice(st) if st.variadic => write!(f, "...{}", st.elt),
            Type::Slice(st) => write!(f, "[]{}", st.elt),
            Type::Map(mt) => write!(f, "map[{}]{}", mt.key, mt.value),
            Type::Pointer(pt) => write!(f, "*{}", pt.elt),
            Type::Struct(st) => {
                f.write_str("struct{")?;
                write_fields(f, &st.fields, "; ")?;
                f.write_str("}")
            }
            Type::Func(ft) => {
                f.write_str("func(")?;
                write_fields(f, &ft.params, ", ")?;
                f.write_str(")")?;
                match ft.results.as_slice() {
                    [] => Ok(()),
                    [only] if only.name.is_empty() => write!(f, " {}", only.ty),
                    results => {
                        f.write_str(" (")?;
                        write_fields(f, results, ", ")?;
                        f.write_str(")")
                    }
                }
            }
            Type::Interface(it) => {
                f.write_str("interface{")?;
                write_fields(f, &it.methods, "; ")?;
                f.write_str("}")
            }
            Type::Chan(ct) => match ct.dir {
                ChanDir::Send => write!(f, "chan<- {}", ct.elt),
                ChanDir::Recv => write!(f, "<-chan {}", ct.elt),
                ChanDir::Both => write!(f, "chan {}", ct.elt),
            },
            Type::Declared(dt) if dt.pkg_path.is_empty() => write!(f, "{}", dt.name),
            Type::Declared(dt) => write!(f, "{}.{}", dt.pkg_path, dt.name),
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[FieldType], sep: &str) -> fmt::Result {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if field.name.is_empty() {
            write!(f, "{}", field.ty)?;
        } else {
            write!(f, "{} {}", field.name, field.ty)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
