//! Node construction shorthands.
//!
//! Thin wrappers over the `alloc_*` methods for the node shapes the
//! preprocessor and tests build most often.

use super::{Ast, DeclKind, ExprKind, KeyValue, StmtKind};
use crate::{
    AssignOp, BinaryOp, DeclId, ExprId, IncDecOp, LitKind, Name, StmtId, Type, TypedValue,
    UnaryOp, ValuePath,
};

impl Ast {
    /// Identifier already resolved to `path`.
    pub fn name(&mut self, name: &str, path: ValuePath) -> ExprId {
        self.alloc_expr(ExprKind::Name {
            name: Name::intern(name),
            path,
        })
    }

    pub fn basic_lit(&mut self, kind: LitKind, text: &str) -> ExprId {
        self.alloc_expr(ExprKind::BasicLit {
            kind,
            text: text.into(),
        })
    }

    pub fn int_lit(&mut self, text: &str) -> ExprId {
        self.basic_lit(LitKind::Int, text)
    }

    /// `text` is the quoted source form, e.g. `"\"abc\""`.
    pub fn string_lit(&mut self, text: &str) -> ExprId {
        self.basic_lit(LitKind::String, text)
    }

    /// `text` is the quoted source form, e.g. `"'a'"`.
    pub fn char_lit(&mut self, text: &str) -> ExprId {
        self.basic_lit(LitKind::Char, text)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, x: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::Unary { op, x })
    }

    pub fn call(&mut self, func: ExprId, args: Vec<ExprId>) -> ExprId {
        self.alloc_expr(ExprKind::Call {
            func,
            args,
            varg: false,
        })
    }

    pub fn index(&mut self, x: ExprId, index: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::Index { x, index })
    }

    pub fn selector(&mut self, x: ExprId, path: ValuePath) -> ExprId {
        self.alloc_expr(ExprKind::Selector {
            x,
            path,
            sel: path.name,
        })
    }

    pub fn star(&mut self, x: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::Star { x })
    }

    pub fn reference(&mut self, x: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::Ref { x })
    }

    pub fn type_assert(&mut self, x: ExprId, ty: ExprId, has_ok: bool) -> ExprId {
        self.alloc_expr(ExprKind::TypeAssert { x, ty, has_ok })
    }

    pub fn composite_lit(&mut self, ty: ExprId, elts: Vec<KeyValue>) -> ExprId {
        self.alloc_expr(ExprKind::CompositeLit { ty, elts })
    }

    /// Function literal with a fresh, uninitialized scope.
    pub fn func_lit(&mut self, ty: ExprId, body: Vec<StmtId>) -> ExprId {
        self.alloc_scoped_expr(|scope| ExprKind::FuncLit { scope, ty, body })
    }

    pub fn constant(&mut self, value: TypedValue) -> ExprId {
        self.alloc_expr(ExprKind::Const {
            source: None,
            value,
        })
    }

    pub fn const_type(&mut self, ty: Type) -> ExprId {
        self.alloc_expr(ExprKind::ConstType { source: None, ty })
    }

    /// `name ty`; an empty `name` makes an anonymous field or parameter.
    pub fn field_type(&mut self, name: &str, ty: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::FieldType {
            name: Name::intern(name),
            ty,
            tag: None,
        })
    }

    pub fn func_type(&mut self, params: Vec<ExprId>, results: Vec<ExprId>) -> ExprId {
        self.alloc_expr(ExprKind::FuncType { params, results })
    }

    pub fn array_type(&mut self, len: Option<ExprId>, elt: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::ArrayType { len, elt })
    }

    pub fn slice_type(&mut self, elt: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::SliceType {
            elt,
            variadic: false,
        })
    }

    pub fn map_type(&mut self, key: ExprId, value: ExprId) -> ExprId {
        self.alloc_expr(ExprKind::MapType { key, value })
    }

    pub fn struct_type(&mut self, fields: Vec<ExprId>) -> ExprId {
        self.alloc_expr(ExprKind::StructType { fields })
    }

    pub fn expr_stmt(&mut self, x: ExprId) -> StmtId {
        self.alloc_stmt(StmtKind::Expr { x })
    }

    /// `lhs = rhs`
    pub fn assign(&mut self, lhs: Vec<ExprId>, rhs: Vec<ExprId>) -> StmtId {
        self.alloc_stmt(StmtKind::Assign {
            lhs,
            op: AssignOp::Assign,
            rhs,
        })
    }

    /// `lhs := rhs`
    pub fn define_stmt(&mut self, lhs: Vec<ExprId>, rhs: Vec<ExprId>) -> StmtId {
        self.alloc_stmt(StmtKind::Assign {
            lhs,
            op: AssignOp::Define,
            rhs,
        })
    }

    /// `lhs op= rhs`
    pub fn assign_op(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> StmtId {
        self.alloc_stmt(StmtKind::Assign {
            lhs: vec![lhs],
            op: AssignOp::Compound(op),
            rhs: vec![rhs],
        })
    }

    pub fn inc_dec(&mut self, x: ExprId, op: IncDecOp) -> StmtId {
        self.alloc_stmt(StmtKind::IncDec { x, op })
    }

    pub fn block(&mut self, body: Vec<StmtId>) -> StmtId {
        self.alloc_scoped_stmt(|scope| StmtKind::Block { scope, body })
    }

    pub fn if_stmt(
        &mut self,
        init: Option<StmtId>,
        cond: ExprId,
        body: Vec<StmtId>,
        els: Vec<StmtId>,
    ) -> StmtId {
        self.alloc_scoped_stmt(|scope| StmtKind::If {
            scope,
            init,
            cond,
            body,
            els,
        })
    }

    pub fn return_stmt(&mut self, results: Vec<ExprId>) -> StmtId {
        self.alloc_stmt(StmtKind::Return { results })
    }

    pub fn decl_stmt(&mut self, decls: Vec<DeclId>) -> StmtId {
        self.alloc_stmt(StmtKind::Decl { decls })
    }

    /// `var name ty = value`, with `name` resolved to `path`.
    pub fn var_decl(
        &mut self,
        name: &str,
        path: ValuePath,
        ty: Option<ExprId>,
        value: Option<ExprId>,
    ) -> DeclId {
        self.alloc_decl(DeclKind::Value {
            name: Name::intern(name),
            path,
            ty,
            value,
            is_const: false,
        })
    }

    pub fn func_decl(&mut self, name: &str, ty: ExprId, body: Vec<StmtId>) -> DeclId {
        let name = Name::intern(name);
        self.alloc_scoped_decl(|scope| DeclKind::Func {
            scope,
            name,
            is_method: false,
            recv: None,
            ty,
            body,
        })
    }

    pub fn import_decl(&mut self, name: &str, pkg_path: &str) -> DeclId {
        self.alloc_decl(DeclKind::Import {
            name: Name::intern(name),
            pkg_path: pkg_path.into(),
        })
    }

    pub fn type_decl(&mut self, name: &str, ty: ExprId) -> DeclId {
        self.alloc_decl(DeclKind::Type {
            name: Name::intern(name),
            ty,
            is_alias: false,
        })
    }
}
