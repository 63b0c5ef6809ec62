//! Source-like rendering of nodes, for diagnostics and traces.
//!
//! Statements render on one line, separated by `; ` inside braces.

use std::fmt::{self, Write as _};

use tern_stack::ensure_sufficient_stack;

use super::{Ast, DeclKind, ExprKind, KeyValue, StmtKind};
use crate::{ChanDir, DeclId, ExprId, NodeId, StmtId};

/// A node paired with its arena, implementing `Display`.
#[derive(Copy, Clone)]
pub struct NodeDisplay<'a> {
    ast: &'a Ast,
    node: NodeId,
}

impl Ast {
    pub fn display(&self, node: impl Into<NodeId>) -> NodeDisplay<'_> {
        NodeDisplay {
            ast: self,
            node: node.into(),
        }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer { ast: self.ast, f };
        match self.node {
            NodeId::Expr(id) => p.expr(id),
            NodeId::Stmt(id) => p.stmt(id),
            NodeId::Decl(id) => p.decl(id),
            NodeId::File(id) => {
                let file = self.ast.file(id);
                write!(p.f, "package {} // {}", file.pkg_name, file.name)?;
                for &d in &file.decls {
                    p.f.write_str("; ")?;
                    p.decl(d)?;
                }
                Ok(())
            }
            NodeId::Package(id) => {
                let pkg = self.ast.package(id);
                write!(
                    p.f,
                    "package {} ({:?}, {} files)",
                    pkg.pkg_name,
                    &*pkg.pkg_path,
                    pkg.files.len()
                )
            }
        }
    }
}

impl fmt::Debug for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {self}", self.node)
    }
}

struct Printer<'a, 'f, 'b> {
    ast: &'a Ast,
    f: &'f mut fmt::Formatter<'b>,
}

impl Printer<'_, '_, '_> {
    fn exprs(&mut self, ids: &[ExprId], sep: &str) -> fmt::Result {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                self.f.write_str(sep)?;
            }
            self.expr(id)?;
        }
        Ok(())
    }

    fn opt_expr(&mut self, id: Option<ExprId>) -> fmt::Result {
        match id {
            Some(id) => self.expr(id),
            None => Ok(()),
        }
    }

    fn expr(&mut self, id: ExprId) -> fmt::Result {
        let ast = self.ast;
        ensure_sufficient_stack(|| match ast.expr(id) {
            ExprKind::Name { name, .. } => write!(self.f, "{name}"),
            ExprKind::BasicLit { text, .. } => self.f.write_str(text),
            ExprKind::Binary { op, left, right } => {
                self.f.write_char('(')?;
                self.expr(*left)?;
                write!(self.f, " {op} ")?;
                self.expr(*right)?;
                self.f.write_char(')')
            }
            ExprKind::Call { func, args, varg } => {
                self.expr(*func)?;
                self.f.write_char('(')?;
                self.exprs(args, ", ")?;
                if *varg {
                    self.f.write_str("...")?;
                }
                self.f.write_char(')')
            }
            ExprKind::Index { x, index } => {
                self.expr(*x)?;
                self.f.write_char('[')?;
                self.expr(*index)?;
                self.f.write_char(']')
            }
            ExprKind::Selector { x, sel, .. } => {
                self.expr(*x)?;
                write!(self.f, ".{sel}")
            }
            ExprKind::Slice { x, low, high, max } => {
                self.expr(*x)?;
                self.f.write_char('[')?;
                self.opt_expr(*low)?;
                self.f.write_char(':')?;
                self.opt_expr(*high)?;
                if let Some(max) = max {
                    self.f.write_char(':')?;
                    self.expr(*max)?;
                }
                self.f.write_char(']')
            }
            ExprKind::Star { x } => {
                self.f.write_char('*')?;
                self.expr(*x)
            }
            ExprKind::Ref { x } => {
                self.f.write_char('&')?;
                self.expr(*x)
            }
            ExprKind::TypeAssert { x, ty, .. } => {
                self.expr(*x)?;
                self.f.write_str(".(")?;
                self.expr(*ty)?;
                self.f.write_char(')')
            }
            ExprKind::Unary { op, x } => {
                write!(self.f, "{op}")?;
                self.expr(*x)
            }
            ExprKind::CompositeLit { ty, elts } => {
                self.expr(*ty)?;
                self.f.write_char('{')?;
                for (i, kv) in elts.iter().enumerate() {
                    if i > 0 {
                        self.f.write_str(", ")?;
                    }
                    self.key_value(*kv)?;
                }
                self.f.write_char('}')
            }
            ExprKind::FuncLit { ty, body, .. } => {
                self.expr(*ty)?;
                self.f.write_char(' ')?;
                self.body(body)
            }
            ExprKind::Const { source: Some(src), .. } => self.expr(*src),
            ExprKind::Const { value, .. } => write!(self.f, "{}", value.v),
            ExprKind::ConstType { source: Some(src), .. } => self.expr(*src),
            ExprKind::ConstType { ty, .. } => write!(self.f, "{ty}"),
            ExprKind::FieldType { name, ty, tag } => {
                if !name.is_empty() {
                    write!(self.f, "{name} ")?;
                }
                self.expr(*ty)?;
                if let Some(tag) = tag {
                    self.f.write_char(' ')?;
                    self.expr(*tag)?;
                }
                Ok(())
            }
            ExprKind::ArrayType { len, elt } => {
                self.f.write_char('[')?;
                match len {
                    Some(len) => self.expr(*len)?,
                    None => self.f.write_str("...")?,
                }
                self.f.write_char(']')?;
                self.expr(*elt)
            }
            ExprKind::SliceType { elt, variadic } => {
                self.f.write_str(if *variadic { "..." } else { "[]" })?;
                self.expr(*elt)
            }
            ExprKind::InterfaceType { methods } => {
                self.f.write_str("interface{")?;
                self.exprs(methods, "; ")?;
                self.f.write_char('}')
            }
            ExprKind::ChanType { dir, value } => {
                self.f.write_str(match dir {
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                    ChanDir::Both => "chan ",
                })?;
                self.expr(*value)
            }
            ExprKind::FuncType { params, results } => {
                self.f.write_str("func(")?;
                self.exprs(params, ", ")?;
                self.f.write_char(')')?;
                if !results.is_empty() {
                    self.f.write_str(" (")?;
                    self.exprs(results, ", ")?;
                    self.f.write_char(')')?;
                }
                Ok(())
            }
            ExprKind::MapType { key, value } => {
                self.f.write_str("map[")?;
                self.expr(*key)?;
                self.f.write_char(']')?;
                self.expr(*value)
            }
            ExprKind::StructType { fields } => {
                self.f.write_str("struct{")?;
                self.exprs(fields, "; ")?;
                self.f.write_char('}')
            }
        })
    }

    fn key_value(&mut self, kv: KeyValue) -> fmt::Result {
        if let Some(key) = kv.key {
            self.expr(key)?;
            self.f.write_str(": ")?;
        }
        self.expr(kv.value)
    }

    fn body(&mut self, body: &[StmtId]) -> fmt::Result {
        self.f.write_char('{')?;
        for (i, &s) in body.iter().enumerate() {
            self.f.write_str(if i == 0 { " " } else { "; " })?;
            self.stmt(s)?;
        }
        if !body.is_empty() {
            self.f.write_char(' ')?;
        }
        self.f.write_char('}')
    }

    fn stmt(&mut self, id: StmtId) -> fmt::Result {
        let ast = self.ast;
        ensure_sufficient_stack(|| match ast.stmt(id) {
            StmtKind::Assign { lhs, op, rhs } => {
                self.exprs(lhs, ", ")?;
                write!(self.f, " {op} ")?;
                self.exprs(rhs, ", ")
            }
            StmtKind::Block { body, .. } => self.body(body),
            StmtKind::Branch { op, label } => {
                write!(self.f, "{op}")?;
                if !label.is_empty() {
                    write!(self.f, " {label}")?;
                }
                Ok(())
            }
            StmtKind::Decl { decls } => {
                for (i, &d) in decls.iter().enumerate() {
                    if i > 0 {
                        self.f.write_str("; ")?;
                    }
                    self.decl(d)?;
                }
                Ok(())
            }
            StmtKind::Defer { call } => {
                self.f.write_str("defer ")?;
                self.expr(*call)
            }
            StmtKind::Empty => Ok(()),
            StmtKind::Expr { x } => self.expr(*x),
            StmtKind::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                self.f.write_str("for ")?;
                if let Some(init) = init {
                    self.stmt(*init)?;
                }
                self.f.write_str("; ")?;
                self.opt_expr(*cond)?;
                self.f.write_str("; ")?;
                if let Some(post) = post {
                    self.stmt(*post)?;
                }
                self.f.write_char(' ')?;
                self.body(body)
            }
            StmtKind::Go { call } => {
                self.f.write_str("go ")?;
                self.expr(*call)
            }
            StmtKind::If {
                init,
                cond,
                body,
                els,
                ..
            } => {
                self.f.write_str("if ")?;
                if let Some(init) = init {
                    self.stmt(*init)?;
                    self.f.write_str("; ")?;
                }
                self.expr(*cond)?;
                self.f.write_char(' ')?;
                self.body(body)?;
                if !els.is_empty() {
                    self.f.write_str(" else ")?;
                    self.body(els)?;
                }
                Ok(())
            }
            StmtKind::IncDec { x, op } => {
                self.expr(*x)?;
                write!(self.f, "{op}")
            }
            StmtKind::Labeled { label, stmt } => {
                write!(self.f, "{label}: ")?;
                self.stmt(*stmt)
            }
            StmtKind::Range {
                x,
                key,
                value,
                op,
                body,
                ..
            } => {
                self.f.write_str("for ")?;
                if let Some(key) = key {
                    self.expr(*key)?;
                    if let Some(value) = value {
                        self.f.write_str(", ")?;
                        self.expr(*value)?;
                    }
                    write!(self.f, " {op} ")?;
                }
                self.f.write_str("range ")?;
                self.expr(*x)?;
                self.f.write_char(' ')?;
                self.body(body)
            }
            StmtKind::Return { results } => {
                self.f.write_str("return")?;
                if !results.is_empty() {
                    self.f.write_char(' ')?;
                    self.exprs(results, ", ")?;
                }
                Ok(())
            }
            StmtKind::Select { cases } => {
                self.f.write_str("select ")?;
                self.body(cases)
            }
            StmtKind::SelectCase { comm, body, .. } => {
                match comm {
                    Some(comm) => {
                        self.f.write_str("case ")?;
                        self.stmt(*comm)?;
                    }
                    None => self.f.write_str("default")?,
                }
                self.f.write_str(": ")?;
                self.body(body)
            }
            StmtKind::Send { chan, value } => {
                self.expr(*chan)?;
                self.f.write_str(" <- ")?;
                self.expr(*value)
            }
            StmtKind::Switch { init, x, cases, .. } => {
                self.f.write_str("switch ")?;
                if let Some(init) = init {
                    self.stmt(*init)?;
                    self.f.write_str("; ")?;
                }
                if let Some(x) = x {
                    self.expr(*x)?;
                    self.f.write_char(' ')?;
                }
                self.body(cases)
            }
            StmtKind::SwitchCase { cases, body, .. } => {
                if cases.is_empty() {
                    self.f.write_str("default")?;
                } else {
                    self.f.write_str("case ")?;
                    self.exprs(cases, ", ")?;
                }
                self.f.write_str(": ")?;
                self.body(body)
            }
        })
    }

    fn decl(&mut self, id: DeclId) -> fmt::Result {
        let ast = self.ast;
        match ast.decl(id) {
            DeclKind::Func {
                name,
                recv,
                ty,
                body,
                ..
            } => {
                self.f.write_str("func ")?;
                if let Some(recv) = recv {
                    self.f.write_char('(')?;
                    self.expr(*recv)?;
                    self.f.write_str(") ")?;
                }
                write!(self.f, "{name} ")?;
                self.expr(*ty)?;
                self.f.write_char(' ')?;
                self.body(body)
            }
            DeclKind::Import { name, pkg_path } => {
                write!(self.f, "import {name} {:?}", &**pkg_path)
            }
            DeclKind::Value {
                name,
                ty,
                value,
                is_const,
                ..
            } => {
                self.f.write_str(if *is_const { "const " } else { "var " })?;
                write!(self.f, "{name}")?;
                if let Some(ty) = ty {
                    self.f.write_char(' ')?;
                    self.expr(*ty)?;
                }
                if let Some(value) = value {
                    self.f.write_str(" = ")?;
                    self.expr(*value)?;
                }
                Ok(())
            }
            DeclKind::Type { name, ty, is_alias } => {
                write!(self.f, "type {name}")?;
                self.f.write_str(if *is_alias { " = " } else { " " })?;
                self.expr(*ty)
            }
        }
    }
}
