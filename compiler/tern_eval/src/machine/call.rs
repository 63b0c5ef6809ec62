//! Calls, builtins and returns.
//!
//! A closure call instantiates the function's static block under the
//! closure's captured block and binds arguments into its slots:
//! receiver first, then parameters, then named results. The frame records
//! the stack heights at entry; a return cuts every stack back to them and
//! leaves only the results.

use std::rc::Rc;

use smallvec::SmallVec;
use tern_ir::{
    ArrayValue, Builtin, DeclKind, ExprKind, FuncSource, FuncValue, PointerValue, SliceValue,
    SlotRef, Type, TypedValue, Value,
};
use tern_realm::ObjectCell;

use super::expr::auto_deref;
use super::{Frame, Machine, Op};
use crate::{ops, EvalError, EvalResult};

type Args = SmallVec<[TypedValue; 4]>;

impl Machine<'_> {
    /// The callee is on the value stack: evaluate the arguments above it.
    pub(super) fn op_precall(&mut self) -> EvalResult {
        let id = self.peek_expr()?;
        let ast = self.ast;
        let ExprKind::Call { args, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let base = self
            .values
            .len()
            .checked_sub(1)
            .ok_or(EvalError::StackUnderflow { stack: "value" })?;
        self.ops.push(Op::Call { base });
        for &arg in args.iter().rev() {
            self.schedule(arg);
        }
        Ok(())
    }

    pub(super) fn op_call(&mut self, base: usize) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::Call { varg, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        if base >= self.values.len() {
            return Err(EvalError::StackUnderflow { stack: "value" });
        }
        let args: Args = self.values.drain(base + 1..).collect();
        let callee = self.pop_value()?;
        tracing::trace!(callee = %callee, args = args.len(), "call");
        match &callee.v {
            Value::Type(t) => {
                let [arg] = args.as_slice() else {
                    return Err(EvalError::ArityMismatch {
                        expected: 1,
                        got: args.len(),
                    });
                };
                let converted = ops::convert(arg, t)?;
                self.values.push(converted);
                Ok(())
            }
            Value::Builtin(b) => self.call_builtin(*b, args, *varg),
            Value::Func(func) => self.enter(Rc::clone(func), None, args, *varg),
            Value::BoundMethod(bm) => {
                self.enter(Rc::clone(&bm.func), Some(bm.recv.clone()), args, *varg)
            }
            Value::None => Err(EvalError::NilDereference),
            _ => Err(EvalError::NotCallable {
                what: callee.to_string(),
            }),
        }
    }

    fn call_builtin(&mut self, builtin: Builtin, args: Args, varg: bool) -> EvalResult {
        let result = match builtin {
            Builtin::Len | Builtin::Cap => {
                let [arg] = args.as_slice() else {
                    return Err(EvalError::ArityMismatch {
                        expected: 1,
                        got: args.len(),
                    });
                };
                let n = length(arg, builtin == Builtin::Cap)?;
                let n = i64::try_from(n)
                    .map_err(|_| EvalError::Internal(format!("length {n} overflows int")))?;
                TypedValue::int(n)
            }
            Builtin::Append => self.append(args, varg)?,
        };
        self.values.push(result);
        Ok(())
    }

    /// `append(s, x...)`: writes in place while capacity lasts, otherwise
    /// copies into a new backing array of at least twice the capacity.
    fn append(&mut self, args: Args, varg: bool) -> EvalResult<TypedValue> {
        let mut args = args.into_iter();
        let dst = args.next().ok_or(EvalError::ArityMismatch {
            expected: 1,
            got: 0,
        })?;
        let Some(t) = dst.t.clone() else {
            return Err(EvalError::mismatch("first argument to append is untyped nil"));
        };
        let Type::Slice(st) = t.underlying() else {
            return Err(EvalError::mismatch(format!(
                "first argument to append is not a slice: {dst}"
            )));
        };
        let elt = st.elt.clone();

        let extra: Vec<TypedValue> = if varg {
            let rest: Args = args.collect();
            let [spread] = rest.as_slice() else {
                return Err(EvalError::ArityMismatch {
                    expected: 2,
                    got: rest.len() + 1,
                });
            };
            match &spread.v {
                Value::Slice(s) => s.to_vec(),
                Value::String(s) => s
                    .iter()
                    .map(|&b| TypedValue::new(Type::UINT8, Value::Uint(u64::from(b))))
                    .collect(),
                Value::None => Vec::new(),
                _ => {
                    return Err(EvalError::mismatch(format!(
                        "cannot spread {spread} into append"
                    )))
                }
            }
        } else {
            args.collect()
        };
        let extra = extra
            .iter()
            .map(|v| ops::convert(v, &elt))
            .collect::<Result<Vec<_>, _>>()?;
        if extra.is_empty() {
            return Ok(dst);
        }

        let old = match &dst.v {
            Value::Slice(s) => Some(s.clone()),
            Value::None => None,
            _ => return Err(EvalError::mismatch(format!("cannot append to {dst}"))),
        };
        let (len, cap) = old.as_ref().map_or((0, 0), |s| (s.len, s.cap));
        let new_len = len + extra.len();

        let slice = match old {
            Some(s) if new_len <= cap => {
                for (i, v) in extra.into_iter().enumerate() {
                    let ptr = PointerValue::Elem {
                        target: s.base.clone(),
                        index: s.offset + len + i,
                    };
                    self.store(&ptr, v)?;
                }
                SliceValue { len: new_len, ..s }
            }
            old => {
                let new_cap = new_len.max(cap * 2);
                let mut elems: Vec<TypedValue> = old
                    .map(|s| s.to_vec().iter().map(TypedValue::copy).collect())
                    .unwrap_or_default();
                elems.extend(extra.iter().map(TypedValue::copy));
                elems.resize_with(new_cap, || TypedValue::zero(&elt));
                SliceValue {
                    base: ObjectCell::new(ArrayValue::new(elems)),
                    offset: 0,
                    len: new_len,
                    cap: new_cap,
                }
            }
        };
        Ok(TypedValue::new(t, Value::Slice(slice)))
    }

    /// Push a frame for `func` and schedule its body.
    fn enter(
        &mut self,
        func: Rc<FuncValue>,
        recv: Option<TypedValue>,
        args: Args,
        varg: bool,
    ) -> EvalResult {
        let limit = self.config.max_call_depth;
        if self.frames.len() >= limit {
            return Err(EvalError::CallDepthExceeded { limit });
        }
        let Type::Func(ft) = func.ty.underlying() else {
            return Err(EvalError::mismatch(format!(
                "cannot call {} of type {}",
                func.name, func.ty
            )));
        };
        let ft = Rc::clone(ft);

        let ast = self.ast;
        let (scope, body, is_method) = match func.source {
            FuncSource::Lit(id) => match ast.expr(id) {
                ExprKind::FuncLit { scope, body, .. } => (*scope, body, false),
                _ => return Err(self.unexpected_expr(id)),
            },
            FuncSource::Decl(id) => match ast.decl(id) {
                DeclKind::Func {
                    scope,
                    body,
                    is_method,
                    ..
                } => (*scope, body, *is_method),
                _ => return Err(self.unexpected_decl(id)),
            },
        };

        let block = ast.instantiate(scope, func.closure.clone())?;
        self.adopt(&block)?;

        let mut args = args.into_vec();
        // A method called through its declaration takes the receiver as
        // the first argument.
        let recv = match recv {
            Some(r) => Some(r),
            None if is_method => {
                if args.is_empty() {
                    return Err(EvalError::ArityMismatch {
                        expected: ft.params.len() + 1,
                        got: 0,
                    });
                }
                Some(args.remove(0))
            }
            None => None,
        };

        let mut slot = 0;
        if let Some(recv) = recv {
            self.bind_receiver(&block, recv)?;
            slot = 1;
        }

        if ft.is_variadic() {
            pack_variadic(&ft.params, &mut args, varg)?;
        }
        if args.len() != ft.params.len() {
            return Err(EvalError::ArityMismatch {
                expected: ft.params.len(),
                got: args.len(),
            });
        }
        let results_at = slot + ft.params.len();
        let needed = if ft.has_named_results() {
            results_at + ft.results.len()
        } else {
            results_at
        };
        let have = block.borrow().len();
        if have < needed {
            return Err(EvalError::Internal(format!(
                "function {} has {have} slots, needs {needed}",
                func.name
            )));
        }
        for (i, arg) in args.into_iter().enumerate() {
            let target = self.slot_target(SlotRef {
                block: block.clone(),
                index: slot + i,
            })?;
            self.assign(&target, arg)?;
        }

        tracing::debug!(func = %func.name, depth = self.frames.len() + 1, "enter");
        let heights = self.heights();
        self.frames.push(Frame {
            func,
            ft,
            block: block.clone(),
            results_at,
            heights,
        });
        self.push_block(block);
        self.ops.push(Op::CallReturn);
        self.schedule_body(body);
        Ok(())
    }

    /// Store the receiver in slot 0, loading through a pointer when the
    /// method takes its receiver by value.
    fn bind_receiver(&mut self, block: &tern_ir::BlockRef, recv: TypedValue) -> EvalResult {
        let target = self.slot_target(SlotRef {
            block: block.clone(),
            index: 0,
        })?;
        let wants_pointer = matches!(
            target.t.as_ref().map(Type::underlying),
            Some(Type::Pointer(pt)) if matches!(pt.elt.underlying(), Type::Pointer(_))
        );
        let is_pointer = matches!(recv.t.as_ref().map(Type::underlying), Some(Type::Pointer(_)));
        let recv = if is_pointer && !wants_pointer {
            auto_deref(recv)?
        } else {
            recv
        };
        self.assign(&target, recv)
    }

    /// Finish the innermost call: results sit above `base`, or, for a bare
    /// return, in the named result slots.
    pub(super) fn op_return(&mut self, base: usize) -> EvalResult {
        let frame = self
            .frames
            .last()
            .ok_or_else(|| EvalError::Internal("return outside of a function".to_owned()))?;
        if base > self.values.len() {
            return Err(EvalError::StackUnderflow { stack: "value" });
        }
        let mut results = self.values.split_off(base);
        if results.is_empty() && frame.ft.has_named_results() {
            let block = frame.block.borrow();
            results = (0..frame.ft.results.len())
                .map(|i| block.get(frame.results_at + i).cloned().unwrap_or_default())
                .collect();
        }
        if results.len() != frame.ft.results.len() {
            return Err(EvalError::ArityMismatch {
                expected: frame.ft.results.len(),
                got: results.len(),
            });
        }
        let results = results
            .iter()
            .zip(&frame.ft.results)
            .map(|(tv, r)| ops::convert(tv, &r.ty))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(frame) = self.frames.pop() else {
            return Err(EvalError::StackUnderflow { stack: "frame" });
        };
        tracing::debug!(func = %frame.func.name, results = results.len(), "return");
        let h = frame.heights;
        self.ops.truncate(h.ops);
        self.exprs.truncate(h.exprs);
        self.values.truncate(h.values);
        self.stmts.truncate(h.stmts);
        self.blocks.truncate(h.blocks);
        self.values.extend(results);
        Ok(())
    }
}

/// `len` or `cap` of a string, array, slice or map; nil has length 0.
fn length(arg: &TypedValue, cap: bool) -> EvalResult<usize> {
    let arg = auto_deref(arg.clone())?;
    match &arg.v {
        Value::String(s) if !cap => Ok(s.len()),
        Value::Array(a) => Ok(a.borrow().elems.len()),
        Value::Slice(s) => Ok(if cap { s.cap } else { s.len }),
        Value::Map(m) if !cap => Ok(m.borrow().len()),
        Value::None if arg.t.is_some() => Ok(0),
        _ => Err(EvalError::mismatch(format!(
            "invalid argument {arg} for {}",
            if cap { "cap" } else { "len" }
        ))),
    }
}

/// Collect trailing arguments into the variadic parameter's slice. With
/// `f(xs...)` the spread slice is passed as is, retyped to the parameter.
fn pack_variadic(
    params: &[tern_ir::FieldType],
    args: &mut Vec<TypedValue>,
    varg: bool,
) -> EvalResult {
    let Some(last) = params.last() else {
        return Ok(());
    };
    let vt = last.ty.clone();
    let fixed = params.len() - 1;
    if varg {
        if args.len() != params.len() {
            return Err(EvalError::ArityMismatch {
                expected: params.len(),
                got: args.len(),
            });
        }
        if let Some(spread) = args.last_mut() {
            if !matches!(spread.v, Value::Slice(_) | Value::None) {
                return Err(EvalError::mismatch(format!(
                    "cannot use {spread} as {vt}"
                )));
            }
            spread.t = Some(vt);
        }
        return Ok(());
    }
    if args.len() < fixed {
        return Err(EvalError::ArityMismatch {
            expected: fixed,
            got: args.len(),
        });
    }
    let Type::Slice(st) = vt.underlying() else {
        return Err(EvalError::Internal(format!(
            "variadic parameter of non-slice type {vt}"
        )));
    };
    let rest = args.split_off(fixed);
    let packed = if rest.is_empty() {
        TypedValue::of_type(vt.clone())
    } else {
        let elems = rest
            .iter()
            .map(|a| ops::convert(a, &st.elt).map(|tv| tv.copy()))
            .collect::<Result<Vec<_>, _>>()?;
        TypedValue::new(
            vt.clone(),
            Value::Slice(SliceValue::over(ObjectCell::new(ArrayValue::new(elems)))),
        )
    };
    args.push(packed);
    Ok(())
}
