//! Flat syntax tree.
//!
//! Nodes live in per-category arenas inside [`Ast`] and refer to each other by
//! typed ids. The tree is built once by the parser and preprocessor and is
//! read-only afterwards, except for the attribute side table and the static
//! blocks of scope-owning nodes.
//!
//! # Module Structure
//!
//! - `expr`, `stmt`, `decl`: the closed node kind sets
//! - `attrs`: attribute keys and values
//! - `build`: allocation helpers used by the parser and tests
//! - `copy`: deep copy of subtrees
//! - `display`: source-like rendering

mod attrs;
mod build;
mod copy;
mod decl;
mod display;
mod expr;
mod stmt;

use num_bigint::BigInt;
use rustc_hash::FxHashMap;

use crate::ids::to_u32;
use crate::scope::StaticBlock;
use crate::value::literal;
use crate::{
    DeclId, ExprId, FileId, LitKind, Name, NodeId, PackageId, ScopeError, ScopeId, StmtId,
    ValueError,
};

pub use attrs::{AttrKey, AttrValue, Attributes};
pub use decl::{DeclKind, FileNode, PackageNode};
pub use display::NodeDisplay;
pub use expr::{ExprKind, KeyValue};
pub use stmt::StmtKind;

/// Arena holding every node of one program, plus the scope table and
/// attributes.
#[derive(Debug, Default)]
pub struct Ast {
    exprs: Vec<ExprKind>,
    stmts: Vec<StmtKind>,
    decls: Vec<DeclKind>,
    files: Vec<FileNode>,
    packages: Vec<PackageNode>,
    pub(crate) scopes: Vec<StaticBlock>,
    attrs: FxHashMap<NodeId, Attributes>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(kind);
        id
    }

    /// Allocate a scope-owning expression; `make` receives its fresh scope.
    pub fn alloc_scoped_expr(&mut self, make: impl FnOnce(ScopeId) -> ExprKind) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        let scope = self.alloc_scope(NodeId::Expr(id));
        self.exprs.push(make(scope));
        id
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len(), "statements"));
        self.stmts.push(kind);
        id
    }

    pub fn alloc_scoped_stmt(&mut self, make: impl FnOnce(ScopeId) -> StmtKind) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len(), "statements"));
        let scope = self.alloc_scope(NodeId::Stmt(id));
        self.stmts.push(make(scope));
        id
    }

    pub fn alloc_decl(&mut self, kind: DeclKind) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        self.decls.push(kind);
        id
    }

    pub fn alloc_scoped_decl(&mut self, make: impl FnOnce(ScopeId) -> DeclKind) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        let scope = self.alloc_scope(NodeId::Decl(id));
        self.decls.push(make(scope));
        id
    }

    pub fn alloc_file(&mut self, name: Name, pkg_name: Name, decls: Vec<DeclId>) -> FileId {
        let id = FileId::new(to_u32(self.files.len(), "files"));
        let scope = self.alloc_scope(NodeId::File(id));
        self.files.push(FileNode {
            scope,
            name,
            pkg_name,
            decls,
        });
        id
    }

    pub fn alloc_package(&mut self, pkg_path: &str, pkg_name: Name, files: Vec<FileId>) -> PackageId {
        let id = PackageId::new(to_u32(self.packages.len(), "packages"));
        let scope = self.alloc_scope(NodeId::Package(id));
        self.packages.push(PackageNode {
            scope,
            pkg_path: pkg_path.into(),
            pkg_name,
            files,
        });
        id
    }

    fn alloc_scope(&mut self, source: NodeId) -> ScopeId {
        let id = ScopeId::new(to_u32(self.scopes.len(), "scopes"));
        self.scopes.push(StaticBlock::new(source));
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &StmtKind {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &DeclKind {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.index()]
    }

    #[inline]
    pub fn package(&self, id: PackageId) -> &PackageNode {
        &self.packages[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// The static block a node owns, if it is a block node.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        match node {
            NodeId::Expr(id) => self.expr(id).scope(),
            NodeId::Stmt(id) => self.stmt(id).scope(),
            NodeId::Decl(id) => self.decl(id).scope(),
            NodeId::File(id) => Some(self.file(id).scope),
            NodeId::Package(id) => Some(self.package(id).scope),
        }
    }

    pub fn attr(&self, node: impl Into<NodeId>, key: AttrKey) -> Option<&AttrValue> {
        self.attrs.get(&node.into()).and_then(|a| a.get(key))
    }

    /// Set an attribute, returning the value it replaced.
    ///
    /// Keys are meant to be set once; a replaced value that differs from the
    /// new one is logged so conflicting passes show up in traces.
    pub fn set_attr(
        &mut self,
        node: impl Into<NodeId>,
        key: AttrKey,
        value: AttrValue,
    ) -> Option<AttrValue> {
        let node = node.into();
        let old = self.attrs.entry(node).or_default().set(key, value);
        if let Some(old) = &old {
            if !self.attr(node, key).is_some_and(|new| new.same_as(old)) {
                tracing::debug!(%node, ?key, "attribute overwritten with a different value");
            }
        }
        old
    }

    /// File of `pkg` called `name`.
    pub fn file_by_name(&self, pkg: PackageId, name: Name) -> Option<FileId> {
        self.package(pkg)
            .files
            .iter()
            .copied()
            .find(|&f| self.file(f).name == name)
    }

    /// File-level declaration of `name` in `pkg`. Imports are file scoped
    /// and never match.
    pub fn decl_for(&self, pkg: PackageId, name: Name) -> Result<(FileId, DeclId), ScopeError> {
        for &file in &self.package(pkg).files {
            for &decl in &self.file(file).decls {
                let kind = self.decl(decl);
                if matches!(kind, DeclKind::Import { .. }) {
                    continue;
                }
                if kind.name() == name {
                    return Ok((file, decl));
                }
            }
        }
        Err(ScopeError::DeclNotFound { name })
    }

    /// Unquoted bytes of a string literal.
    pub fn lit_string(&self, id: ExprId) -> Result<Vec<u8>, ValueError> {
        match self.expr(id) {
            ExprKind::BasicLit {
                kind: LitKind::String,
                text,
            } => literal::unquote_string(text),
            other => Err(not_a_literal(LitKind::String, other)),
        }
    }

    /// Value of an integer literal.
    pub fn lit_int(&self, id: ExprId) -> Result<BigInt, ValueError> {
        match self.expr(id) {
            ExprKind::BasicLit {
                kind: LitKind::Int,
                text,
            } => literal::parse_int(text),
            other => Err(not_a_literal(LitKind::Int, other)),
        }
    }
}

fn not_a_literal(kind: LitKind, found: &ExprKind) -> ValueError {
    ValueError::MalformedLiteral {
        kind,
        text: found.kind_name().to_owned(),
        reason: "not a literal of this kind",
    }
}

#[cfg(test)]
mod tests;
