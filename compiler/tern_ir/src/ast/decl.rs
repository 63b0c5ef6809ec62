//! Declarations, files and packages.

use crate::{DeclId, ExprId, FileId, Name, ScopeId, StmtId, ValuePath};

#[derive(Clone, Debug)]
pub enum DeclKind {
    Func {
        scope: ScopeId,
        name: Name,
        is_method: bool,
        /// Receiver `FieldType` for methods.
        recv: Option<ExprId>,
        /// A `FuncType` expression.
        ty: ExprId,
        /// Empty for functions implemented by the host.
        body: Vec<StmtId>,
    },
    Import {
        /// Local package name, or `.`.
        name: Name,
        pkg_path: Box<str>,
    },
    Value {
        name: Name,
        path: ValuePath,
        ty: Option<ExprId>,
        value: Option<ExprId>,
        is_const: bool,
    },
    Type {
        name: Name,
        ty: ExprId,
        is_alias: bool,
    },
}

impl DeclKind {
    /// The declared name.
    pub fn name(&self) -> Name {
        match self {
            DeclKind::Func { name, .. }
            | DeclKind::Import { name, .. }
            | DeclKind::Value { name, .. }
            | DeclKind::Type { name, .. } => *name,
        }
    }

    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            DeclKind::Func { scope, .. } => Some(*scope),
            _ => None,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            DeclKind::Func { .. } => "func declaration",
            DeclKind::Import { .. } => "import",
            DeclKind::Value { is_const: true, .. } => "const declaration",
            DeclKind::Value { .. } => "var declaration",
            DeclKind::Type { .. } => "type declaration",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileNode {
    pub scope: ScopeId,
    pub name: Name,
    pub pkg_name: Name,
    pub decls: Vec<DeclId>,
}

#[derive(Clone, Debug)]
pub struct PackageNode {
    pub scope: ScopeId,
    pub pkg_path: Box<str>,
    pub pkg_name: Name,
    pub files: Vec<FileId>,
}
