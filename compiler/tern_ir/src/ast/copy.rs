//! Deep copy of subtrees.
//!
//! Copies get fresh node ids and fresh, uninitialized static blocks, so a
//! copied function body can be preprocessed again independently of the
//! original. Attributes are not carried over.

use tern_stack::ensure_sufficient_stack;

use super::{Ast, DeclKind, ExprKind, KeyValue, StmtKind};
use crate::{DeclId, ExprId, StmtId};

impl Ast {
    pub fn copy_expr(&mut self, id: ExprId) -> ExprId {
        ensure_sufficient_stack(|| {
            let kind = match self.expr(id).clone() {
                ExprKind::FuncLit { ty, body, .. } => {
                    let ty = self.copy_expr(ty);
                    let body = self.copy_stmts(&body);
                    return self.alloc_scoped_expr(|scope| ExprKind::FuncLit { scope, ty, body });
                }
                ExprKind::Const { source, value } => ExprKind::Const {
                    source: self.copy_opt_expr(source),
                    value: value.copy(),
                },
                ExprKind::ConstType { source, ty } => ExprKind::ConstType {
                    source: self.copy_opt_expr(source),
                    ty,
                },
                kind @ (ExprKind::Name { .. } | ExprKind::BasicLit { .. }) => kind,
                ExprKind::Binary { op, left, right } => ExprKind::Binary {
                    op,
                    left: self.copy_expr(left),
                    right: self.copy_expr(right),
                },
                ExprKind::Call { func, args, varg } => ExprKind::Call {
                    func: self.copy_expr(func),
                    args: self.copy_exprs(&args),
                    varg,
                },
                ExprKind::Index { x, index } => ExprKind::Index {
                    x: self.copy_expr(x),
                    index: self.copy_expr(index),
                },
                ExprKind::Selector { x, path, sel } => ExprKind::Selector {
                    x: self.copy_expr(x),
                    path,
                    sel,
                },
                ExprKind::Slice { x, low, high, max } => ExprKind::Slice {
                    x: self.copy_expr(x),
                    low: self.copy_opt_expr(low),
                    high: self.copy_opt_expr(high),
                    max: self.copy_opt_expr(max),
                },
                ExprKind::Star { x } => ExprKind::Star {
                    x: self.copy_expr(x),
                },
                ExprKind::Ref { x } => ExprKind::Ref {
                    x: self.copy_expr(x),
                },
                ExprKind::TypeAssert { x, ty, has_ok } => ExprKind::TypeAssert {
                    x: self.copy_expr(x),
                    ty: self.copy_expr(ty),
                    has_ok,
                },
                ExprKind::Unary { op, x } => ExprKind::Unary {
                    op,
                    x: self.copy_expr(x),
                },
                ExprKind::CompositeLit { ty, elts } => ExprKind::CompositeLit {
                    ty: self.copy_expr(ty),
                    elts: elts
                        .iter()
                        .map(|kv| KeyValue {
                            key: self.copy_opt_expr(kv.key),
                            value: self.copy_expr(kv.value),
                        })
                        .collect(),
                },
                ExprKind::FieldType { name, ty, tag } => ExprKind::FieldType {
                    name,
                    ty: self.copy_expr(ty),
                    tag: self.copy_opt_expr(tag),
                },
                ExprKind::ArrayType { len, elt } => ExprKind::ArrayType {
                    len: self.copy_opt_expr(len),
                    elt: self.copy_expr(elt),
                },
                ExprKind::SliceType { elt, variadic } => ExprKind::SliceType {
                    elt: self.copy_expr(elt),
                    variadic,
                },
                ExprKind::InterfaceType { methods } => ExprKind::InterfaceType {
                    methods: self.copy_exprs(&methods),
                },
                ExprKind::ChanType { dir, value } => ExprKind::ChanType {
                    dir,
                    value: self.copy_expr(value),
                },
                ExprKind::FuncType { params, results } => ExprKind::FuncType {
                    params: self.copy_exprs(&params),
                    results: self.copy_exprs(&results),
                },
                ExprKind::MapType { key, value } => ExprKind::MapType {
                    key: self.copy_expr(key),
                    value: self.copy_expr(value),
                },
                ExprKind::StructType { fields } => ExprKind::StructType {
                    fields: self.copy_exprs(&fields),
                },
            };
            self.alloc_expr(kind)
        })
    }

    pub fn copy_exprs(&mut self, ids: &[ExprId]) -> Vec<ExprId> {
        ids.iter().map(|&id| self.copy_expr(id)).collect()
    }

    fn copy_opt_expr(&mut self, id: Option<ExprId>) -> Option<ExprId> {
        id.map(|id| self.copy_expr(id))
    }

    pub fn copy_stmt(&mut self, id: StmtId) -> StmtId {
        ensure_sufficient_stack(|| {
            let kind = match self.stmt(id).clone() {
                StmtKind::Block { body, .. } => {
                    let body = self.copy_stmts(&body);
                    return self.alloc_scoped_stmt(|scope| StmtKind::Block { scope, body });
                }
                StmtKind::For {
                    init,
                    cond,
                    post,
                    body,
                    ..
                } => {
                    let init = self.copy_opt_stmt(init);
                    let cond = self.copy_opt_expr(cond);
                    let post = self.copy_opt_stmt(post);
                    let body = self.copy_stmts(&body);
                    return self.alloc_scoped_stmt(|scope| StmtKind::For {
                        scope,
                        init,
                        cond,
                        post,
                        body,
                    });
                }
                StmtKind::If {
                    init,
                    cond,
                    body,
                    els,
                    ..
                } => {
                    let init = self.copy_opt_stmt(init);
                    let cond = self.copy_expr(cond);
                    let body = self.copy_stmts(&body);
                    let els = self.copy_stmts(&els);
                    return self.alloc_scoped_stmt(|scope| StmtKind::If {
                        scope,
                        init,
                        cond,
                        body,
                        els,
                    });
                }
                StmtKind::Range {
                    x,
                    key,
                    value,
                    op,
                    body,
                    ..
                } => {
                    let x = self.copy_expr(x);
                    let key = self.copy_opt_expr(key);
                    let value = self.copy_opt_expr(value);
                    let body = self.copy_stmts(&body);
                    return self.alloc_scoped_stmt(|scope| StmtKind::Range {
                        scope,
                        x,
                        key,
                        value,
                        op,
                        body,
                    });
                }
                StmtKind::SelectCase { comm, body, .. } => {
                    let comm = self.copy_opt_stmt(comm);
                    let body = self.copy_stmts(&body);
                    return self.alloc_scoped_stmt(|scope| StmtKind::SelectCase { scope, comm, body });
                }
                StmtKind::Switch {
                    init,
                    x,
                    cases,
                    var_name,
                    ..
                } => {
                    let init = self.copy_opt_stmt(init);
                    let x = self.copy_opt_expr(x);
                    let cases = self.copy_stmts(&cases);
                    return self.alloc_scoped_stmt(|scope| StmtKind::Switch {
                        scope,
                        init,
                        x,
                        cases,
                        var_name,
                    });
                }
                StmtKind::SwitchCase { cases, body, .. } => {
                    let cases = self.copy_exprs(&cases);
                    let body = self.copy_stmts(&body);
                    return self.alloc_scoped_stmt(|scope| StmtKind::SwitchCase { scope, cases, body });
                }
                StmtKind::Assign { lhs, op, rhs } => StmtKind::Assign {
                    lhs: self.copy_exprs(&lhs),
                    op,
                    rhs: self.copy_exprs(&rhs),
                },
                kind @ (StmtKind::Branch { .. } | StmtKind::Empty) => kind,
                StmtKind::Decl { decls } => StmtKind::Decl {
                    decls: decls.iter().map(|&d| self.copy_decl(d)).collect(),
                },
                StmtKind::Defer { call } => StmtKind::Defer {
                    call: self.copy_expr(call),
                },
                StmtKind::Expr { x } => StmtKind::Expr {
                    x: self.copy_expr(x),
                },
                StmtKind::Go { call } => StmtKind::Go {
                    call: self.copy_expr(call),
                },
                StmtKind::IncDec { x, op } => StmtKind::IncDec {
                    x: self.copy_expr(x),
                    op,
                },
                StmtKind::Labeled { label, stmt } => StmtKind::Labeled {
                    label,
                    stmt: self.copy_stmt(stmt),
                },
                StmtKind::Return { results } => StmtKind::Return {
                    results: self.copy_exprs(&results),
                },
                StmtKind::Select { cases } => StmtKind::Select {
                    cases: self.copy_stmts(&cases),
                },
                StmtKind::Send { chan, value } => StmtKind::Send {
                    chan: self.copy_expr(chan),
                    value: self.copy_expr(value),
                },
            };
            self.alloc_stmt(kind)
        })
    }

    pub fn copy_stmts(&mut self, ids: &[StmtId]) -> Vec<StmtId> {
        ids.iter().map(|&id| self.copy_stmt(id)).collect()
    }

    fn copy_opt_stmt(&mut self, id: Option<StmtId>) -> Option<StmtId> {
        id.map(|id| self.copy_stmt(id))
    }

    pub fn copy_decl(&mut self, id: DeclId) -> DeclId {
        let kind = match self.decl(id).clone() {
            DeclKind::Func {
                name,
                is_method,
                recv,
                ty,
                body,
                ..
            } => {
                let recv = self.copy_opt_expr(recv);
                let ty = self.copy_expr(ty);
                let body = self.copy_stmts(&body);
                return self.alloc_scoped_decl(|scope| DeclKind::Func {
                    scope,
                    name,
                    is_method,
                    recv,
                    ty,
                    body,
                });
            }
            DeclKind::Value {
                name,
                path,
                ty,
                value,
                is_const,
            } => DeclKind::Value {
                name,
                path,
                ty: self.copy_opt_expr(ty),
                value: self.copy_opt_expr(value),
                is_const,
            },
            DeclKind::Type { name, ty, is_alias } => DeclKind::Type {
                name,
                ty: self.copy_expr(ty),
                is_alias,
            },
            kind @ DeclKind::Import { .. } => kind,
        };
        self.alloc_decl(kind)
    }
}
