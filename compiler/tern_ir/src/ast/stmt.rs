//! Statement nodes.

use crate::{AssignOp, BranchOp, DeclId, ExprId, IncDecOp, Name, ScopeId, StmtId};

#[derive(Clone, Debug)]
pub enum StmtKind {
    Assign {
        lhs: Vec<ExprId>,
        op: AssignOp,
        rhs: Vec<ExprId>,
    },
    Block {
        scope: ScopeId,
        body: Vec<StmtId>,
    },
    Branch {
        op: BranchOp,
        /// Empty when unlabeled.
        label: Name,
    },
    Decl {
        decls: Vec<DeclId>,
    },
    Defer {
        /// A `Call` expression.
        call: ExprId,
    },
    Empty,
    Expr {
        x: ExprId,
    },
    For {
        scope: ScopeId,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: Vec<StmtId>,
    },
    Go {
        call: ExprId,
    },
    If {
        scope: ScopeId,
        init: Option<StmtId>,
        cond: ExprId,
        body: Vec<StmtId>,
        els: Vec<StmtId>,
    },
    IncDec {
        x: ExprId,
        op: IncDecOp,
    },
    Labeled {
        label: Name,
        stmt: StmtId,
    },
    Range {
        scope: ScopeId,
        x: ExprId,
        key: Option<ExprId>,
        value: Option<ExprId>,
        /// `Assign` or `Define`.
        op: AssignOp,
        body: Vec<StmtId>,
    },
    Return {
        results: Vec<ExprId>,
    },
    Select {
        /// `SelectCase` statements.
        cases: Vec<StmtId>,
    },
    SelectCase {
        scope: ScopeId,
        /// Send or receive; `None` is the default case.
        comm: Option<StmtId>,
        body: Vec<StmtId>,
    },
    Send {
        chan: ExprId,
        value: ExprId,
    },
    Switch {
        scope: ScopeId,
        init: Option<StmtId>,
        x: Option<ExprId>,
        /// `SwitchCase` statements.
        cases: Vec<StmtId>,
        var_name: Name,
    },
    SwitchCase {
        scope: ScopeId,
        /// Empty for the default case.
        cases: Vec<ExprId>,
        body: Vec<StmtId>,
    },
}

impl StmtKind {
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            StmtKind::Block { scope, .. }
            | StmtKind::For { scope, .. }
            | StmtKind::If { scope, .. }
            | StmtKind::Range { scope, .. }
            | StmtKind::SelectCase { scope, .. }
            | StmtKind::Switch { scope, .. }
            | StmtKind::SwitchCase { scope, .. } => Some(*scope),
            _ => None,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            StmtKind::Assign { .. } => "assignment",
            StmtKind::Block { .. } => "block",
            StmtKind::Branch { .. } => "branch",
            StmtKind::Decl { .. } => "declaration",
            StmtKind::Defer { .. } => "defer",
            StmtKind::Empty => "empty",
            StmtKind::Expr { .. } => "expression",
            StmtKind::For { .. } => "for",
            StmtKind::Go { .. } => "go",
            StmtKind::If { .. } => "if",
            StmtKind::IncDec { .. } => "inc/dec",
            StmtKind::Labeled { .. } => "labeled",
            StmtKind::Range { .. } => "range",
            StmtKind::Return { .. } => "return",
            StmtKind::Select { .. } => "select",
            StmtKind::SelectCase { .. } => "select case",
            StmtKind::Send { .. } => "send",
            StmtKind::Switch { .. } => "switch",
            StmtKind::SwitchCase { .. } => "switch case",
        }
    }
}
