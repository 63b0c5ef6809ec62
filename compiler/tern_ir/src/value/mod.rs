//! Run-time values.
//!
//! A [`TypedValue`] pairs a type with a payload and is the unit moved through
//! the machine stacks and stored in block slots. Structured payloads (arrays,
//! structs, maps, blocks) live on the heap as [`Object`](tern_realm::Object)s so the ownership
//! tracker can follow them.
//!
//! Arrays and structs have value semantics: [`TypedValue::copy`] must be used
//! whenever a value is stored, so two slots never share one array or struct.
//! Slices, maps, pointers and functions are references and copy shallowly.

/// `Object` plumbing shared by the heap value kinds.
macro_rules! impl_object {
    ($ty:ty, $kind:literal) => {
        impl tern_realm::Object for $ty {
            fn object_info(&self) -> &tern_realm::ObjectInfo {
                &self.info
            }

            fn object_info_mut(&mut self) -> &mut tern_realm::ObjectInfo {
                &mut self.info
            }

            fn object_kind(&self) -> &'static str {
                $kind
            }
        }
    };
}

mod block;
mod func;
mod heap;
pub mod literal;
mod pointer;

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use tern_realm::{ObjectCell, ObjectRef};

use crate::{FieldType, Type};

pub use block::{Block, SlotRef};
pub use func::{BoundMethod, Builtin, FuncSource, FuncValue};
pub use heap::{ArrayValue, MapKey, MapValue, SliceValue, StructValue};
pub use pointer::PointerValue;

pub type ArrayRef = ObjectCell<ArrayValue>;
pub type StructRef = ObjectCell<StructValue>;
pub type MapRef = ObjectCell<MapValue>;
pub type BlockRef = ObjectCell<Block>;

/// Payload of a [`TypedValue`].
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Nil, or no payload at all.
    #[default]
    None,
    Bool(bool),
    /// Signed fixed-width integers and runes.
    Int(i64),
    /// Unsigned fixed-width integers.
    Uint(u64),
    /// Untyped integer constants.
    BigInt(Rc<BigInt>),
    /// Strings are byte sequences and need not be valid UTF-8.
    String(Rc<[u8]>),
    Type(Type),
    /// Intermediate result of a field type expression.
    Field(Rc<FieldType>),
    Array(ArrayRef),
    Slice(SliceValue),
    Struct(StructRef),
    Map(MapRef),
    Pointer(PointerValue),
    Func(Rc<FuncValue>),
    BoundMethod(Rc<BoundMethod>),
    Builtin(Builtin),
}

impl Value {
    #[inline]
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s.as_bytes()))
    }

    #[inline]
    pub fn bytes(b: &[u8]) -> Self {
        Value::String(Rc::from(b))
    }

    #[inline]
    pub fn big_int(n: impl Into<BigInt>) -> Self {
        Value::BigInt(Rc::new(n.into()))
    }

    pub fn array(elems: Vec<TypedValue>) -> Self {
        Value::Array(ObjectCell::new(ArrayValue::new(elems)))
    }

    pub fn structure(fields: Vec<TypedValue>) -> Self {
        Value::Struct(ObjectCell::new(StructValue::new(fields)))
    }

    pub fn map() -> Self {
        Value::Map(ObjectCell::new(MapValue::new()))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Same scalar, or same heap object.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Field(a), Value::Field(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Struct(a), Value::Struct(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Slice(a), Value::Slice(b)) => {
                a.base.ptr_eq(&b.base) && a.offset == b.offset && a.len == b.len
            }
            (Value::Pointer(a), Value::Pointer(b)) => a.same_target(b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }

    /// The heap object this payload holds, for ownership updates.
    ///
    /// A slice stands for its backing array and a pointer for the object
    /// it keeps alive.
    pub fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Value::Array(a) => Some(a.as_object()),
            Value::Struct(s) => Some(s.as_object()),
            Value::Map(m) => Some(m.as_object()),
            Value::Slice(s) => Some(s.base.as_object()),
            Value::Pointer(p) => p.target_object(),
            _ => None,
        }
    }
}

/// A (type, payload) pair. Neither set means undefined.
#[derive(Clone, Debug, Default)]
pub struct TypedValue {
    pub t: Option<Type>,
    pub v: Value,
}

impl TypedValue {
    pub const UNDEFINED: TypedValue = TypedValue {
        t: None,
        v: Value::None,
    };

    #[inline]
    pub const fn new(t: Type, v: Value) -> Self {
        TypedValue { t: Some(t), v }
    }

    /// A name declared but not yet typed.
    #[inline]
    pub const fn untyped_slot() -> Self {
        Self::UNDEFINED
    }

    /// A typed slot without a payload (a variable before initialization).
    #[inline]
    pub const fn of_type(t: Type) -> Self {
        TypedValue {
            t: Some(t),
            v: Value::None,
        }
    }

    pub fn untyped_bigint(n: impl Into<BigInt>) -> Self {
        Self::new(Type::UNTYPED_BIGINT, Value::big_int(n))
    }

    pub fn untyped_rune(c: i64) -> Self {
        Self::new(Type::UNTYPED_RUNE, Value::Int(c))
    }

    pub fn untyped_string(s: &str) -> Self {
        Self::new(Type::UNTYPED_STRING, Value::string(s))
    }

    pub fn untyped_bool(b: bool) -> Self {
        Self::new(Type::UNTYPED_BOOL, Value::Bool(b))
    }

    pub fn int(n: i64) -> Self {
        Self::new(Type::INT, Value::Int(n))
    }

    pub fn bool(b: bool) -> Self {
        Self::new(Type::BOOL, Value::Bool(b))
    }

    pub fn string(s: &str) -> Self {
        Self::new(Type::STRING, Value::string(s))
    }

    /// A type used as a value.
    pub fn type_value(t: Type) -> Self {
        Self::new(Type::TYPE, Value::Type(t))
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.t.is_none() && self.v.is_none()
    }

    #[inline]
    pub fn ty(&self) -> Option<&Type> {
        self.t.as_ref()
    }

    /// The type carried by a type value.
    pub fn as_type(&self) -> Option<&Type> {
        match &self.v {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.v {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// The zero value of `t`.
    pub fn zero(t: &Type) -> Self {
        let v = match t.underlying() {
            Type::Primitive(p) if p.is_bool() => Value::Bool(false),
            Type::Primitive(p) if p.is_string() => Value::string(""),
            Type::Primitive(p) if p.is_unsigned() => Value::Uint(0),
            Type::Primitive(p) if p.is_signed() => Value::Int(0),
            Type::Primitive(crate::PrimitiveType::UntypedBigint) => Value::big_int(0),
            Type::Array(at) => Value::array(
                std::iter::repeat_with(|| TypedValue::zero(&at.elt))
                    .take(at.len)
                    .collect(),
            ),
            Type::Struct(st) => Value::structure(
                st.fields.iter().map(|f| TypedValue::zero(&f.ty)).collect(),
            ),
            _ => Value::None,
        };
        TypedValue::new(t.clone(), v)
    }

    /// Copy with value semantics: arrays and structs are duplicated into
    /// fresh, unowned objects; everything else is shared.
    pub fn copy(&self) -> Self {
        let v = match &self.v {
            Value::Array(a) => {
                let elems = a.borrow().elems.iter().map(TypedValue::copy).collect();
                Value::array(elems)
            }
            Value::Struct(s) => {
                let fields = s.borrow().fields.iter().map(TypedValue::copy).collect();
                Value::structure(fields)
            }
            other => other.clone(),
        };
        TypedValue { t: self.t.clone(), v }
    }

    /// The heap object held, if any.
    #[inline]
    pub fn as_object(&self) -> Option<ObjectRef> {
        self.v.as_object()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}"),
            Value::String(s) => write_quoted(f, s),
            Value::Type(t) => write!(f, "{t}"),
            Value::Field(ft) => write!(f, "{} {}", ft.name, ft.ty),
            Value::Array(a) => write_list(f, "[", &a.borrow().elems, "]"),
            Value::Slice(s) => write_list(f, "[", &s.to_vec(), "]"),
            Value::Struct(s) => write_list(f, "{", &s.borrow().fields, "}"),
            Value::Map(m) => {
                f.write_str("map[")?;
                for (i, (k, v)) in m.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k.v, v.v)?;
                }
                f.write_str("]")
            }
            Value::Pointer(p) => write!(f, "&{}", p.load().v),
            Value::Func(fv) => write!(f, "func {}", fv.name),
            Value::BoundMethod(bm) => write!(f, "method {}", bm.func.name),
            Value::Builtin(b) => write!(f, "builtin {}", b.as_str()),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.t {
            None if self.v.is_none() => f.write_str("<undefined>"),
            None => write!(f, "({} <untyped>)", self.v),
            Some(t) => write!(f, "({} {t})", self.v),
        }
    }
}

/// Quote `bytes` like a string literal, escaping invalid UTF-8 as `\xNN`.
fn write_quoted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return write!(f, "{s:?}");
    }
    f.write_str("\"")?;
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            write!(f, "{}", c.escape_debug())?;
        }
        for b in chunk.invalid() {
            write!(f, "\\x{b:02x}")?;
        }
    }
    f.write_str("\"")
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[TypedValue],
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item.v)?;
    }
    f.write_str(close)
}


#[cfg(test)]
mod tests;
