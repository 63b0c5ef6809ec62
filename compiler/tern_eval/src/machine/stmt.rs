//! Statements.
//!
//! Covered: expression statements, assignment (`=`, `:=`, `op=`), inc/dec,
//! blocks, `if`, `return` and `var` declarations. Loops, `switch`,
//! `select`, `defer`, `go`, channel sends and branches fail with
//! [`EvalError::Unsupported`].

use tern_ir::{AssignOp, BinaryOp, BlockRef, DeclId, DeclKind, IncDecOp, StmtKind, TypedValue};

use super::{Machine, Op};
use crate::{ops, EvalError, EvalResult};

impl Machine<'_> {
    pub(super) fn exec_stmt(&mut self) -> EvalResult {
        let id = self.peek_stmt()?;
        let ast = self.ast;
        match ast.stmt(id) {
            StmtKind::Expr { x } => {
                self.pop_stmt()?;
                self.ops.push(Op::Discard {
                    base: self.values.len(),
                });
                self.schedule(*x);
            }
            StmtKind::Assign {
                lhs,
                op: AssignOp::Assign | AssignOp::Define,
                rhs,
            } => {
                // The statement stays on the stack until the values are in.
                self.ops.push(Op::Assign {
                    base: self.values.len(),
                });
                for &r in rhs.iter().rev() {
                    self.schedule(r);
                }
                for &l in lhs.iter().rev() {
                    self.schedule_lvalue(l);
                }
            }
            StmtKind::Assign {
                lhs,
                op: AssignOp::Compound(_),
                rhs,
            } => {
                let ([l], [r]) = (lhs.as_slice(), rhs.as_slice()) else {
                    return Err(EvalError::ArityMismatch {
                        expected: 1,
                        got: lhs.len().max(rhs.len()),
                    });
                };
                self.ops.push(Op::AssignOp);
                self.schedule(*r);
                self.schedule_lvalue(*l);
            }
            StmtKind::IncDec { x, .. } => {
                self.ops.push(Op::IncDec);
                self.schedule_lvalue(*x);
            }
            StmtKind::Block { scope, body } => {
                self.pop_stmt()?;
                let block = ast.instantiate(*scope, Some(self.last_block().clone()))?;
                self.enter_block(block)?;
                self.schedule_body(body);
            }
            StmtKind::If {
                scope, init, cond, ..
            } => {
                let block = ast.instantiate(*scope, Some(self.last_block().clone()))?;
                self.enter_block(block)?;
                self.ops.push(Op::IfCond);
                self.schedule(*cond);
                if let Some(init) = init {
                    self.push_stmt(*init);
                }
            }
            StmtKind::Return { results } => {
                self.pop_stmt()?;
                self.ops.push(Op::Return {
                    base: self.values.len(),
                });
                for &r in results.iter().rev() {
                    self.schedule(r);
                }
            }
            StmtKind::Decl { decls } => {
                self.pop_stmt()?;
                for &d in decls.iter().rev() {
                    match ast.decl(d) {
                        DeclKind::Value {
                            is_const: false,
                            value,
                            ..
                        } => {
                            self.ops.push(Op::DefineVar(d));
                            if let Some(value) = value {
                                self.schedule(*value);
                            }
                        }
                        // Constants and types are folded into the static
                        // block before evaluation.
                        DeclKind::Value { is_const: true, .. } | DeclKind::Type { .. } => {}
                        DeclKind::Func { .. } | DeclKind::Import { .. } => {
                            return Err(self.unexpected_decl(d));
                        }
                    }
                }
            }
            StmtKind::Empty => {
                self.pop_stmt()?;
            }
            other => {
                return Err(EvalError::Unsupported {
                    feature: other.kind_name(),
                })
            }
        }
        Ok(())
    }

    /// Make `block` the active block until the ops pushed after this call
    /// have run.
    fn enter_block(&mut self, block: BlockRef) -> EvalResult {
        self.adopt(&block)?;
        self.push_block(block);
        self.ops.push(Op::PopBlock);
        Ok(())
    }

    /// Targets start at `base`, values follow them.
    pub(super) fn op_assign(&mut self, base: usize) -> EvalResult {
        let id = self.pop_stmt()?;
        let ast = self.ast;
        let StmtKind::Assign { lhs, .. } = ast.stmt(id) else {
            return Err(self.unexpected_stmt(id));
        };
        let n = lhs.len();
        if self.values.len() < base + n {
            return Err(EvalError::StackUnderflow { stack: "value" });
        }
        let values = self.values.split_off(base + n);
        if values.len() != n {
            return Err(EvalError::ArityMismatch {
                expected: n,
                got: values.len(),
            });
        }
        let targets = self.values.split_off(base);
        for (target, value) in targets.iter().zip(values) {
            self.assign(target, value)?;
        }
        Ok(())
    }

    pub(super) fn op_assign_op(&mut self) -> EvalResult {
        let id = self.pop_stmt()?;
        let ast = self.ast;
        let StmtKind::Assign {
            op: AssignOp::Compound(op),
            ..
        } = ast.stmt(id)
        else {
            return Err(self.unexpected_stmt(id));
        };
        let rhs = self.pop_value()?;
        let target = self.pop_value()?;
        let current = self.load(&target)?;
        let result = ops::binary(*op, &current, &rhs)?;
        self.assign(&target, result)
    }

    pub(super) fn op_inc_dec(&mut self) -> EvalResult {
        let id = self.pop_stmt()?;
        let ast = self.ast;
        let StmtKind::IncDec { op, .. } = ast.stmt(id) else {
            return Err(self.unexpected_stmt(id));
        };
        let target = self.pop_value()?;
        let current = self.load(&target)?;
        let op = match op {
            IncDecOp::Inc => BinaryOp::Add,
            IncDecOp::Dec => BinaryOp::Sub,
        };
        let result = ops::binary(op, &current, &TypedValue::untyped_bigint(1))?;
        self.assign(&target, result)
    }

    pub(super) fn op_if_cond(&mut self) -> EvalResult {
        let id = self.pop_stmt()?;
        let ast = self.ast;
        let StmtKind::If { body, els, .. } = ast.stmt(id) else {
            return Err(self.unexpected_stmt(id));
        };
        let cond = self.pop_value()?;
        let Some(taken) = cond.as_bool() else {
            return Err(EvalError::mismatch(format!("non-boolean condition {cond}")));
        };
        self.schedule_body(if taken { body } else { els });
        Ok(())
    }

    pub(super) fn op_define_var(&mut self, decl: DeclId) -> EvalResult {
        let ast = self.ast;
        let DeclKind::Value {
            name, path, value, ..
        } = ast.decl(decl)
        else {
            return Err(self.unexpected_decl(decl));
        };
        let initial = value.map(|_| self.pop_value()).transpose()?;
        let target = self.name_target(decl.into(), *name, *path)?;
        let value = match (initial, target.t.as_ref().map(tern_ir::Type::underlying)) {
            (Some(tv), _) => tv,
            (None, Some(tern_ir::Type::Pointer(pt))) => TypedValue::zero(&pt.elt),
            // Blank without an initializer.
            (None, _) => return Ok(()),
        };
        tracing::trace!(%name, "define var");
        self.assign(&target, value)
    }
}
