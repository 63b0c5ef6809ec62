//! Expression and type-expression nodes.

use crate::{
    BinaryOp, ChanDir, ExprId, LitKind, Name, ScopeId, StmtId, Type, TypedValue, UnaryOp,
    ValuePath,
};

/// One element of a composite literal: `value` or `key: value`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Option<ExprId>,
    pub value: ExprId,
}

impl KeyValue {
    pub const fn positional(value: ExprId) -> Self {
        KeyValue { key: None, value }
    }

    pub const fn keyed(key: ExprId, value: ExprId) -> Self {
        KeyValue {
            key: Some(key),
            value,
        }
    }
}

/// Expression kinds.
///
/// Type expressions share the arena with value expressions: they evaluate
/// on the same stacks to type values.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Identifier with its resolved path.
    Name { name: Name, path: ValuePath },
    /// Literal text, verbatim from the source.
    BasicLit { kind: LitKind, text: Box<str> },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Call {
        func: ExprId,
        args: Vec<ExprId>,
        /// The last argument is spread with `...`.
        varg: bool,
    },
    Index { x: ExprId, index: ExprId },
    Selector { x: ExprId, path: ValuePath, sel: Name },
    Slice {
        x: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
        max: Option<ExprId>,
    },
    /// `*x`: dereference, or a pointer type when `x` is a type.
    Star { x: ExprId },
    /// `&x`
    Ref { x: ExprId },
    TypeAssert {
        x: ExprId,
        ty: ExprId,
        /// Two-result `v, ok := x.(T)` form.
        has_ok: bool,
    },
    Unary { op: UnaryOp, x: ExprId },
    CompositeLit { ty: ExprId, elts: Vec<KeyValue> },
    FuncLit {
        scope: ScopeId,
        /// A `FuncType` expression.
        ty: ExprId,
        body: Vec<StmtId>,
    },
    /// Constant folded by preprocessing.
    Const {
        source: Option<ExprId>,
        value: TypedValue,
    },

    // Type expressions
    FieldType {
        name: Name,
        ty: ExprId,
        tag: Option<ExprId>,
    },
    ArrayType { len: Option<ExprId>, elt: ExprId },
    SliceType { elt: ExprId, variadic: bool },
    /// `methods` are `FieldType` expressions.
    InterfaceType { methods: Vec<ExprId> },
    ChanType { dir: ChanDir, value: ExprId },
    /// `params` and `results` are `FieldType` expressions.
    FuncType {
        params: Vec<ExprId>,
        results: Vec<ExprId>,
    },
    MapType { key: ExprId, value: ExprId },
    /// `fields` are `FieldType` expressions.
    StructType { fields: Vec<ExprId> },
    /// Type folded by preprocessing.
    ConstType { source: Option<ExprId>, ty: Type },
}

impl ExprKind {
    pub fn is_type_expr(&self) -> bool {
        matches!(
            self,
            ExprKind::FieldType { .. }
                | ExprKind::ArrayType { .. }
                | ExprKind::SliceType { .. }
                | ExprKind::InterfaceType { .. }
                | ExprKind::ChanType { .. }
                | ExprKind::FuncType { .. }
                | ExprKind::MapType { .. }
                | ExprKind::StructType { .. }
                | ExprKind::ConstType { .. }
        )
    }

    /// The static block owned by this node, if it introduces a scope.
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            ExprKind::FuncLit { scope, .. } => Some(*scope),
            _ => None,
        }
    }

    /// Short kind name for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::Name { .. } => "name",
            ExprKind::BasicLit { .. } => "basic literal",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Call { .. } => "call",
            ExprKind::Index { .. } => "index",
            ExprKind::Selector { .. } => "selector",
            ExprKind::Slice { .. } => "slice",
            ExprKind::Star { .. } => "star",
            ExprKind::Ref { .. } => "ref",
            ExprKind::TypeAssert { .. } => "type assertion",
            ExprKind::Unary { .. } => "unary",
            ExprKind::CompositeLit { .. } => "composite literal",
            ExprKind::FuncLit { .. } => "function literal",
            ExprKind::Const { .. } => "constant",
            ExprKind::FieldType { .. } => "field type",
            ExprKind::ArrayType { .. } => "array type",
            ExprKind::SliceType { .. } => "slice type",
            ExprKind::InterfaceType { .. } => "interface type",
            ExprKind::ChanType { .. } => "chan type",
            ExprKind::FuncType { .. } => "func type",
            ExprKind::MapType { .. } => "map type",
            ExprKind::StructType { .. } => "struct type",
            ExprKind::ConstType { .. } => "constant type",
        }
    }
}
