//! The explicit-stack machine.
//!
//! # Architecture
//!
//! Evaluation never recurses on the host stack. Work is a stack of [`Op`]s;
//! each step pops one op and runs it. An op either finishes a node at once
//! (names, literals, constants) or pushes a combine op followed by the ops
//! for its children, so children run first and the combine step finds their
//! results on the value stack.
//!
//! Six stacks make up the state:
//! - `ops`: pending operations
//! - `exprs`: expression nodes whose combine step has not run yet
//! - `values`: results waiting to be consumed
//! - `stmts`: statement nodes being executed
//! - `blocks`: run-time blocks; the last one is the active scope
//! - `frames`: closure calls, each recording the stack heights to restore
//!
//! Between steps the whole state is observable through the accessors, so a
//! caller can meter, pause and inspect evaluation.
//!
//! # Module Structure
//!
//! - `expr`: dispatch and combine steps for expressions and type expressions
//! - `call`: calls, builtins, frames and returns
//! - `stmt`: the statement subset
//! - `store`: assignment and ownership updates

mod call;
mod expr;
mod stmt;
mod store;

use std::rc::Rc;

use tern_ir::{Ast, BlockRef, DeclId, ExprId, FuncType, FuncValue, StmtId, TypedValue};
use tern_realm::Realm;

use crate::{EvalError, EvalResult, MachineBuilder, MachineConfig, Universe};

/// One unit of pending work.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Evaluate the expression on top of the expression stack.
    Eval,
    /// Evaluate it as an assignment target, producing a pointer.
    EvalLvalue,

    // Expression combine steps
    /// Left operand of `&&`/`||` is ready: short-circuit or go on.
    Binary1,
    Binary,
    Unary,
    /// Callee is ready: record where arguments start and evaluate them.
    Precall,
    /// Callee sits at `base` on the value stack, arguments above it.
    Call { base: usize },
    Index,
    Selector,
    Slice,
    Star,
    TypeAssert,
    /// Literal type is ready: evaluate the elements.
    CompositeType,
    /// Elements start at `base`; the literal type sits just below.
    CompositeLit { base: usize },
    FuncLit,
    FieldType,
    ArrayType,
    SliceType,
    InterfaceType,
    ChanType,
    FuncType,
    MapType,
    StructType,

    // Assignment targets
    LvIndex,
    LvSelector,
    LvStar,
    /// Move a composite literal to a fresh heap item and point at it.
    HeapAlloc,

    // Statements
    /// Execute the statement on top of the statement stack.
    Exec,
    /// Drop expression-statement results above `base`.
    Discard { base: usize },
    /// Targets start at `base`, values follow them.
    Assign { base: usize },
    AssignOp,
    IncDec,
    IfCond,
    DefineVar(DeclId),
    /// Results of a `return` start at `base`.
    Return { base: usize },
    /// Bottom of a call frame: the body ran off its end.
    CallReturn,
    PopBlock,
}

/// Outcome of [`Machine::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// No op was pending.
    Idle,
}

/// Stack heights captured when a frame is entered or a top-level
/// evaluation starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Heights {
    ops: usize,
    exprs: usize,
    values: usize,
    stmts: usize,
    blocks: usize,
    frames: usize,
}

/// An active closure call.
struct Frame {
    func: Rc<FuncValue>,
    ft: Rc<FuncType>,
    block: BlockRef,
    /// Slot of the first named result.
    results_at: usize,
    heights: Heights,
}

/// Continuation-passing evaluator over an [`Ast`].
pub struct Machine<'a> {
    ast: &'a Ast,
    universe: &'a Universe,
    config: MachineConfig,
    realm: Option<Realm>,
    /// Active block when nothing is pushed.
    base: BlockRef,
    ops: Vec<Op>,
    exprs: Vec<ExprId>,
    values: Vec<TypedValue>,
    stmts: Vec<StmtId>,
    blocks: Vec<BlockRef>,
    frames: Vec<Frame>,
    steps: u64,
}

impl<'a> Machine<'a> {
    /// A machine with default configuration and an empty base block.
    pub fn new(ast: &'a Ast, universe: &'a Universe) -> Self {
        MachineBuilder::new(ast, universe).build()
    }

    pub(crate) fn from_parts(
        ast: &'a Ast,
        universe: &'a Universe,
        config: MachineConfig,
        base: BlockRef,
        realm: Option<Realm>,
    ) -> Self {
        Machine {
            ast,
            universe,
            config,
            realm,
            base,
            ops: Vec::new(),
            exprs: Vec::new(),
            values: Vec::new(),
            stmts: Vec::new(),
            blocks: Vec::new(),
            frames: Vec::new(),
            steps: 0,
        }
    }

    #[inline]
    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    #[inline]
    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    #[inline]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn realm(&self) -> Option<&Realm> {
        self.realm.as_ref()
    }

    pub fn realm_mut(&mut self) -> Option<&mut Realm> {
        self.realm.as_mut()
    }

    /// Detach the realm; later stores are no longer tracked.
    pub fn take_realm(&mut self) -> Option<Realm> {
        self.realm.take()
    }

    // Inspection

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn exprs(&self) -> &[ExprId] {
        &self.exprs
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    pub fn stmts(&self) -> &[StmtId] {
        &self.stmts
    }

    pub fn blocks(&self) -> &[BlockRef] {
        &self.blocks
    }

    /// Number of closure calls in progress.
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Steps taken since construction or the last [`Machine::reset`].
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_idle(&self) -> bool {
        self.ops.is_empty()
    }

    // Stack manipulation

    /// The active block.
    pub fn last_block(&self) -> &BlockRef {
        self.blocks.last().unwrap_or(&self.base)
    }

    pub fn push_block(&mut self, block: BlockRef) {
        self.blocks.push(block);
    }

    pub fn pop_block(&mut self) -> Option<BlockRef> {
        self.blocks.pop()
    }

    /// Schedule `expr` for evaluation; its results land on the value stack.
    pub fn push_expr(&mut self, expr: ExprId) {
        self.exprs.push(expr);
        self.ops.push(Op::Eval);
    }

    /// Schedule `stmt` for execution.
    pub fn push_stmt(&mut self, stmt: StmtId) {
        self.stmts.push(stmt);
        self.ops.push(Op::Exec);
    }

    pub fn pop_value(&mut self) -> EvalResult<TypedValue> {
        self.values
            .pop()
            .ok_or(EvalError::StackUnderflow { stack: "value" })
    }

    /// Drop all pending work and every pushed block and frame.
    pub fn reset(&mut self) {
        self.ops.clear();
        self.exprs.clear();
        self.values.clear();
        self.stmts.clear();
        self.blocks.clear();
        self.frames.clear();
        self.steps = 0;
    }

    // Driving

    /// Run one op.
    pub fn step(&mut self) -> EvalResult<Step> {
        let Some(op) = self.ops.pop() else {
            return Ok(Step::Idle);
        };
        self.steps += 1;
        tracing::trace!(?op, values = self.values.len(), "step");
        match op {
            Op::Eval => self.eval_expr()?,
            Op::EvalLvalue => self.eval_lvalue()?,
            Op::Binary1 => self.op_binary1()?,
            Op::Binary => self.op_binary()?,
            Op::Unary => self.op_unary()?,
            Op::Precall => self.op_precall()?,
            Op::Call { base } => self.op_call(base)?,
            Op::Index => self.op_index()?,
            Op::Selector => self.op_selector()?,
            Op::Slice => self.op_slice()?,
            Op::Star => self.op_star()?,
            Op::TypeAssert => self.op_type_assert()?,
            Op::CompositeType => self.op_composite_type()?,
            Op::CompositeLit { base } => self.op_composite_lit(base)?,
            Op::FuncLit => self.op_func_lit()?,
            Op::FieldType => self.op_field_type()?,
            Op::ArrayType => self.op_array_type()?,
            Op::SliceType => self.op_slice_type()?,
            Op::InterfaceType => self.op_interface_type()?,
            Op::ChanType => self.op_chan_type()?,
            Op::FuncType => self.op_func_type()?,
            Op::MapType => self.op_map_type()?,
            Op::StructType => self.op_struct_type()?,
            Op::LvIndex => self.op_lv_index()?,
            Op::LvSelector => self.op_lv_selector()?,
            Op::LvStar => self.op_lv_star()?,
            Op::HeapAlloc => self.op_heap_alloc()?,
            Op::Exec => self.exec_stmt()?,
            Op::Discard { base } => self.truncate_values(base)?,
            Op::Assign { base } => self.op_assign(base)?,
            Op::AssignOp => self.op_assign_op()?,
            Op::IncDec => self.op_inc_dec()?,
            Op::IfCond => self.op_if_cond()?,
            Op::DefineVar(decl) => self.op_define_var(decl)?,
            Op::Return { base } => self.op_return(base)?,
            Op::CallReturn => {
                let base = self.values.len();
                self.op_return(base)?;
            }
            Op::PopBlock => {
                self.blocks
                    .pop()
                    .ok_or(EvalError::StackUnderflow { stack: "block" })?;
            }
        }
        Ok(Step::Continue)
    }

    /// Step until idle.
    ///
    /// With a step budget, fails with [`EvalError::StepBudgetExceeded`] once
    /// the budget is spent and work remains; the stacks are left as they
    /// were so the caller can inspect them.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> EvalResult {
        let start = self.steps;
        loop {
            if let Some(limit) = self.config.max_steps {
                if self.steps - start >= limit && !self.ops.is_empty() {
                    return Err(EvalError::StepBudgetExceeded { limit });
                }
            }
            if self.step()? == Step::Idle {
                return Ok(());
            }
        }
    }

    /// Evaluate a single-valued expression.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn eval(&mut self, expr: ExprId) -> EvalResult<TypedValue> {
        let mut results = self.eval_multi(expr)?;
        match results.pop() {
            Some(tv) if results.is_empty() => Ok(tv),
            last => Err(EvalError::ArityMismatch {
                expected: 1,
                got: results.len() + usize::from(last.is_some()),
            }),
        }
    }

    /// Evaluate an expression that may yield any number of values, such as
    /// a call.
    pub fn eval_multi(&mut self, expr: ExprId) -> EvalResult<Vec<TypedValue>> {
        let start = self.heights();
        self.push_expr(expr);
        self.run()?;
        let results = self.values.split_off(start.values.min(self.values.len()));
        self.check_balanced(start)?;
        Ok(results)
    }

    /// Execute a statement in the active block.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn exec(&mut self, stmt: StmtId) -> EvalResult {
        let start = self.heights();
        self.push_stmt(stmt);
        self.run()?;
        self.check_balanced(start)
    }

    // Internal helpers shared by the submodules

    fn heights(&self) -> Heights {
        Heights {
            ops: self.ops.len(),
            exprs: self.exprs.len(),
            values: self.values.len(),
            stmts: self.stmts.len(),
            blocks: self.blocks.len(),
            frames: self.frames.len(),
        }
    }

    /// After a top-level evaluation, with its results taken off, every stack
    /// is back where it started.
    fn check_balanced(&self, start: Heights) -> EvalResult {
        if !self.config.check_invariants {
            return Ok(());
        }
        let now = self.heights();
        if now != start {
            return Err(EvalError::Internal(format!(
                "unbalanced stacks after evaluation: started at {start:?}, ended at {now:?}"
            )));
        }
        Ok(())
    }

    #[inline]
    fn schedule(&mut self, expr: ExprId) {
        self.exprs.push(expr);
        self.ops.push(Op::Eval);
    }

    #[inline]
    fn schedule_lvalue(&mut self, expr: ExprId) {
        self.exprs.push(expr);
        self.ops.push(Op::EvalLvalue);
    }

    /// Schedule `stmts` to run in order.
    fn schedule_body(&mut self, stmts: &[StmtId]) {
        for &s in stmts.iter().rev() {
            self.push_stmt(s);
        }
    }

    fn pop_expr(&mut self) -> EvalResult<ExprId> {
        self.exprs
            .pop()
            .ok_or(EvalError::StackUnderflow { stack: "expression" })
    }

    fn peek_expr(&self) -> EvalResult<ExprId> {
        self.exprs
            .last()
            .copied()
            .ok_or(EvalError::StackUnderflow { stack: "expression" })
    }

    fn pop_stmt(&mut self) -> EvalResult<StmtId> {
        self.stmts
            .pop()
            .ok_or(EvalError::StackUnderflow { stack: "statement" })
    }

    fn peek_stmt(&self) -> EvalResult<StmtId> {
        self.stmts
            .last()
            .copied()
            .ok_or(EvalError::StackUnderflow { stack: "statement" })
    }

    /// The top `n` values, in push order.
    fn pop_values(&mut self, n: usize) -> EvalResult<Vec<TypedValue>> {
        let len = self.values.len();
        if n > len {
            return Err(EvalError::StackUnderflow { stack: "value" });
        }
        Ok(self.values.split_off(len - n))
    }

    fn unexpected_expr(&self, id: ExprId) -> EvalError {
        EvalError::UnexpectedNode {
            node: id.into(),
            kind: self.ast.expr(id).kind_name(),
        }
    }

    fn unexpected_stmt(&self, id: StmtId) -> EvalError {
        EvalError::UnexpectedNode {
            node: id.into(),
            kind: self.ast.stmt(id).kind_name(),
        }
    }

    fn unexpected_decl(&self, id: DeclId) -> EvalError {
        EvalError::UnexpectedNode {
            node: id.into(),
            kind: self.ast.decl(id).kind_name(),
        }
    }

    fn truncate_values(&mut self, base: usize) -> EvalResult {
        if base > self.values.len() {
            return Err(EvalError::StackUnderflow { stack: "value" });
        }
        self.values.truncate(base);
        Ok(())
    }
}
