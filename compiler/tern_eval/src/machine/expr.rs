//! Expressions and type expressions.
//!
//! `eval_expr` looks at the expression on top of the expression stack.
//! Leaves are finished at once. Everything else leaves its node on the
//! expression stack, pushes a combine op and schedules its children; the
//! combine op pops the node and the children's results.

use std::rc::Rc;

use tern_ir::value::literal::unquote_char;
use tern_ir::{
    ArrayValue, BoundMethod, ChanType, ExprId, ExprKind, FieldType, FuncSource, FuncValue,
    InterfaceType, LitKind, MapValue, Name, NodeId, PointerValue, SliceType, SliceValue,
    SlotRef, Type, TypedValue, Value, ValueError, ValuePath,
};
use tern_realm::ObjectCell;

use super::{Machine, Op};
use crate::{ops, EvalError, EvalResult};

impl Machine<'_> {
    pub(super) fn eval_expr(&mut self) -> EvalResult {
        let id = self.peek_expr()?;
        let ast = self.ast;
        match ast.expr(id) {
            ExprKind::Name { name, path } => {
                self.pop_expr()?;
                let tv = self.read_name(id, *name, *path)?;
                self.values.push(tv);
            }
            ExprKind::BasicLit { kind, text } => {
                self.pop_expr()?;
                let tv = self.basic_lit(id, *kind, text)?;
                self.values.push(tv);
            }
            ExprKind::Const { value, .. } => {
                self.pop_expr()?;
                self.values.push(value.clone());
            }
            ExprKind::ConstType { ty, .. } => {
                self.pop_expr()?;
                self.values.push(TypedValue::type_value(ty.clone()));
            }
            ExprKind::Binary { op, left, right } => {
                if op.is_short_circuit() {
                    self.ops.push(Op::Binary1);
                } else {
                    self.ops.push(Op::Binary);
                    self.schedule(*right);
                }
                self.schedule(*left);
            }
            ExprKind::Unary { x, .. } => {
                self.ops.push(Op::Unary);
                self.schedule(*x);
            }
            ExprKind::Call { func, .. } => {
                self.ops.push(Op::Precall);
                self.schedule(*func);
            }
            ExprKind::Index { x, index } => {
                self.ops.push(Op::Index);
                self.schedule(*index);
                self.schedule(*x);
            }
            ExprKind::Selector { x, .. } => {
                self.ops.push(Op::Selector);
                self.schedule(*x);
            }
            ExprKind::Slice { x, low, high, max } => {
                self.ops.push(Op::Slice);
                for bound in [max, high, low].into_iter().flatten() {
                    self.schedule(*bound);
                }
                self.schedule(*x);
            }
            ExprKind::Star { x } => {
                self.ops.push(Op::Star);
                self.schedule(*x);
            }
            ExprKind::Ref { x } => {
                self.pop_expr()?;
                self.schedule_lvalue(*x);
            }
            ExprKind::TypeAssert { x, ty, .. } => {
                self.ops.push(Op::TypeAssert);
                self.schedule(*ty);
                self.schedule(*x);
            }
            ExprKind::CompositeLit { ty, .. } => {
                self.ops.push(Op::CompositeType);
                self.schedule(*ty);
            }
            ExprKind::FuncLit { ty, .. } => {
                self.ops.push(Op::FuncLit);
                self.schedule(*ty);
            }
            ExprKind::FieldType { ty, .. } => {
                self.ops.push(Op::FieldType);
                self.schedule(*ty);
            }
            ExprKind::ArrayType { len, elt } => {
                let Some(len) = len else {
                    // `[...]T` lengths are filled in before evaluation.
                    return Err(self.unexpected_expr(id));
                };
                self.ops.push(Op::ArrayType);
                self.schedule(*elt);
                self.schedule(*len);
            }
            ExprKind::SliceType { elt, .. } => {
                self.ops.push(Op::SliceType);
                self.schedule(*elt);
            }
            ExprKind::InterfaceType { methods } => {
                self.ops.push(Op::InterfaceType);
                self.schedule_all(methods);
            }
            ExprKind::ChanType { value, .. } => {
                self.ops.push(Op::ChanType);
                self.schedule(*value);
            }
            ExprKind::FuncType { params, results } => {
                self.ops.push(Op::FuncType);
                self.schedule_all(results);
                self.schedule_all(params);
            }
            ExprKind::MapType { key, value } => {
                self.ops.push(Op::MapType);
                self.schedule(*value);
                self.schedule(*key);
            }
            ExprKind::StructType { fields } => {
                self.ops.push(Op::StructType);
                self.schedule_all(fields);
            }
        }
        Ok(())
    }

    /// Schedule `exprs` so they evaluate left to right.
    fn schedule_all(&mut self, exprs: &[ExprId]) {
        for &e in exprs.iter().rev() {
            self.schedule(e);
        }
    }

    fn read_name(&self, id: ExprId, name: Name, path: ValuePath) -> EvalResult<TypedValue> {
        if name.is_blank() {
            return Err(self.unexpected_expr(id));
        }
        if path.is_universe() {
            return Ok(self.universe.value_at(path)?);
        }
        Ok(SlotRef::resolve(self.last_block(), path)?.get())
    }

    fn basic_lit(&self, id: ExprId, kind: LitKind, text: &str) -> EvalResult<TypedValue> {
        match kind {
            LitKind::Int => Ok(TypedValue::untyped_bigint(self.ast.lit_int(id)?)),
            LitKind::String => Ok(TypedValue::new(
                Type::UNTYPED_STRING,
                Value::bytes(&self.ast.lit_string(id)?),
            )),
            LitKind::Char => Ok(TypedValue::untyped_rune(i64::from(unquote_char(text)?))),
            LitKind::Float => Err(EvalError::Unsupported {
                feature: "floating-point literals",
            }),
            LitKind::Imag => Err(EvalError::Unsupported {
                feature: "imaginary literals",
            }),
        }
    }

    // Operators

    pub(super) fn op_binary1(&mut self) -> EvalResult {
        let id = self.peek_expr()?;
        let ast = self.ast;
        let ExprKind::Binary { op, right, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let left = self
            .values
            .last()
            .ok_or(EvalError::StackUnderflow { stack: "value" })?;
        let Some(b) = left.as_bool() else {
            return Err(EvalError::mismatch(format!(
                "operator {op} not defined on {left}"
            )));
        };
        let decided = match op {
            tern_ir::BinaryOp::LogicalAnd => !b,
            _ => b,
        };
        if decided {
            // The left operand is the result.
            self.pop_expr()?;
        } else {
            self.ops.push(Op::Binary);
            self.schedule(*right);
        }
        Ok(())
    }

    pub(super) fn op_binary(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::Binary { op, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let right = self.pop_value()?;
        let left = self.pop_value()?;
        let result = ops::binary(*op, &left, &right)?;
        self.values.push(result);
        Ok(())
    }

    pub(super) fn op_unary(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::Unary { op, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let x = self.pop_value()?;
        let result = ops::unary(*op, &x)?;
        self.values.push(result);
        Ok(())
    }

    pub(super) fn op_index(&mut self) -> EvalResult {
        self.pop_expr()?;
        let index = self.pop_value()?;
        let x = auto_deref(self.pop_value()?)?;
        let result = index_value(&x, &index)?;
        self.values.push(result);
        Ok(())
    }

    pub(super) fn op_selector(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::Selector { path, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let x = self.pop_value()?;
        let result = member(x, *path)?;
        self.values.push(result);
        Ok(())
    }

    pub(super) fn op_slice(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::Slice { low, high, max, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let max = max.map(|_| self.pop_value()).transpose()?;
        let high = high.map(|_| self.pop_value()).transpose()?;
        let low = low.map(|_| self.pop_value()).transpose()?;
        let x = auto_deref(self.pop_value()?)?;
        let result = slice_value(&x, low.as_ref(), high.as_ref(), max.as_ref())?;
        self.values.push(result);
        Ok(())
    }

    pub(super) fn op_star(&mut self) -> EvalResult {
        self.pop_expr()?;
        let x = self.pop_value()?;
        let result = if let Some(t) = x.as_type() {
            TypedValue::type_value(Type::pointer(t.clone()))
        } else {
            match &x.v {
                Value::Pointer(p) => p.load(),
                Value::None => return Err(EvalError::NilDereference),
                _ => {
                    return Err(EvalError::mismatch(format!(
                        "invalid indirect of {x}"
                    )))
                }
            }
        };
        self.values.push(result);
        Ok(())
    }

    pub(super) fn op_type_assert(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::TypeAssert { has_ok, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let want = self.pop_type()?;
        let x = self.pop_value()?;
        let ok = match (&x.t, want.underlying()) {
            (None, _) => false,
            (Some(t), Type::Interface(it)) => t.implements(it),
            (Some(t), _) => *t == want,
        };
        if *has_ok {
            let value = match (ok, want.is_interface()) {
                (true, _) => x,
                (false, true) => TypedValue::UNDEFINED,
                (false, false) => TypedValue::zero(&want),
            };
            self.values.push(value);
            self.values.push(TypedValue::untyped_bool(ok));
        } else if ok {
            self.values.push(x);
        } else {
            return Err(EvalError::TypeAssertion {
                got: x
                    .t
                    .as_ref()
                    .map_or_else(|| "nil".to_owned(), ToString::to_string),
                want: want.to_string(),
            });
        }
        Ok(())
    }

    // Composite and function literals

    /// The literal's type is on the value stack: evaluate its elements.
    /// Struct literal keys are field names and are not evaluated.
    pub(super) fn op_composite_type(&mut self) -> EvalResult {
        let id = self.peek_expr()?;
        let ast = self.ast;
        let ExprKind::CompositeLit { elts, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let is_struct = match self.values.last().and_then(TypedValue::as_type) {
            Some(t) => matches!(t.underlying(), Type::Struct(_)),
            None => return Err(EvalError::mismatch("composite literal of a non-type")),
        };
        self.ops.push(Op::CompositeLit {
            base: self.values.len(),
        });
        for kv in elts.iter().rev() {
            self.schedule(kv.value);
            if let Some(key) = kv.key {
                if !is_struct {
                    self.schedule(key);
                }
            }
        }
        Ok(())
    }

    pub(super) fn op_composite_lit(&mut self, base: usize) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::CompositeLit { elts, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        if base > self.values.len() {
            return Err(EvalError::StackUnderflow { stack: "value" });
        }
        let vals = self.values.split_off(base);
        let ty = self.pop_type()?;
        let v = match ty.underlying() {
            Type::Struct(st) => {
                let mut fields: Vec<TypedValue> =
                    st.fields.iter().map(|f| TypedValue::zero(&f.ty)).collect();
                let keyed = elts.iter().any(|kv| kv.key.is_some());
                if !keyed && !vals.is_empty() && vals.len() != fields.len() {
                    return Err(EvalError::ArityMismatch {
                        expected: fields.len(),
                        got: vals.len(),
                    });
                }
                for (i, (kv, val)) in elts.iter().zip(vals).enumerate() {
                    let index = match kv.key {
                        Some(key) => self.field_key(key, &st.fields)?,
                        None => i,
                    };
                    let (Some(slot), Some(field)) = (fields.get_mut(index), st.fields.get(index))
                    else {
                        return Err(index_error(index, st.fields.len()));
                    };
                    *slot = ops::convert(&val, &field.ty)?.copy();
                }
                Value::structure(fields)
            }
            Type::Array(at) => Value::array(sequence(&at.elt, elts, vals, Some(at.len))?),
            Type::Slice(st) => {
                let elems = sequence(&st.elt, elts, vals, None)?;
                Value::Slice(SliceValue::over(ObjectCell::new(ArrayValue::new(elems))))
            }
            Type::Map(mt) => {
                let mut map = MapValue::new();
                let mut vals = vals.into_iter();
                for kv in elts {
                    if kv.key.is_none() {
                        return Err(EvalError::mismatch("missing key in map literal"));
                    }
                    let (Some(k), Some(v)) = (vals.next(), vals.next()) else {
                        return Err(EvalError::StackUnderflow { stack: "value" });
                    };
                    map.insert(ops::convert(&k, &mt.key)?, ops::convert(&v, &mt.value)?.copy())?;
                }
                Value::Map(ObjectCell::new(map))
            }
            _ => {
                return Err(EvalError::mismatch(format!(
                    "invalid composite literal type {ty}"
                )))
            }
        };
        self.values.push(TypedValue::new(ty, v));
        Ok(())
    }

    /// Index of the field a struct literal key names.
    fn field_key(&self, key: ExprId, fields: &[FieldType]) -> EvalResult<usize> {
        let ExprKind::Name { name, .. } = self.ast.expr(key) else {
            return Err(self.unexpected_expr(key));
        };
        fields
            .iter()
            .position(|f| f.name == *name)
            .ok_or_else(|| {
                ValueError::UnknownMember {
                    name: *name,
                    ty: "struct literal".to_owned(),
                }
                .into()
            })
    }

    pub(super) fn op_func_lit(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ty = self.pop_type()?;
        if !matches!(ty.underlying(), Type::Func(_)) {
            return Err(EvalError::mismatch(format!(
                "function literal of non-function type {ty}"
            )));
        }
        let func = FuncValue {
            name: Name::EMPTY,
            ty: ty.clone(),
            source: FuncSource::Lit(id),
            closure: Some(self.last_block().clone()),
        };
        self.values
            .push(TypedValue::new(ty, Value::Func(Rc::new(func))));
        Ok(())
    }

    // Type expressions

    pub(super) fn op_field_type(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::FieldType { name, tag, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let ty = self.pop_type()?;
        let tag: Option<Rc<[u8]>> = tag
            .map(|t| ast.lit_string(t).map(Rc::from))
            .transpose()?;
        let field = FieldType {
            name: *name,
            ty,
            tag,
        };
        self.values
            .push(TypedValue::new(Type::TYPE, Value::Field(Rc::new(field))));
        Ok(())
    }

    pub(super) fn op_array_type(&mut self) -> EvalResult {
        self.pop_expr()?;
        let elt = self.pop_type()?;
        let len = self.pop_value()?;
        let n = ops::to_i128(&len)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| EvalError::mismatch(format!("invalid array length {len}")))?;
        self.values
            .push(TypedValue::type_value(Type::array(n, elt)));
        Ok(())
    }

    pub(super) fn op_slice_type(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::SliceType { variadic, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let elt = self.pop_type()?;
        let t = Type::Slice(Rc::new(SliceType {
            elt,
            variadic: *variadic,
        }));
        self.values.push(TypedValue::type_value(t));
        Ok(())
    }

    pub(super) fn op_interface_type(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::InterfaceType { methods } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let methods = self.pop_fields(methods.len())?;
        let t = Type::Interface(Rc::new(InterfaceType { methods }));
        self.values.push(TypedValue::type_value(t));
        Ok(())
    }

    pub(super) fn op_chan_type(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::ChanType { dir, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let elt = self.pop_type()?;
        let t = Type::Chan(Rc::new(ChanType { dir: *dir, elt }));
        self.values.push(TypedValue::type_value(t));
        Ok(())
    }

    pub(super) fn op_func_type(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::FuncType { params, results } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let mut fields = self.pop_fields(params.len() + results.len())?;
        let results = fields.split_off(params.len());
        self.values
            .push(TypedValue::type_value(Type::func(fields, results)));
        Ok(())
    }

    pub(super) fn op_map_type(&mut self) -> EvalResult {
        self.pop_expr()?;
        let value = self.pop_type()?;
        let key = self.pop_type()?;
        self.values
            .push(TypedValue::type_value(Type::map(key, value)));
        Ok(())
    }

    pub(super) fn op_struct_type(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::StructType { fields } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let fields = self.pop_fields(fields.len())?;
        self.values
            .push(TypedValue::type_value(Type::structure(fields)));
        Ok(())
    }

    fn pop_type(&mut self) -> EvalResult<Type> {
        let tv = self.pop_value()?;
        match tv.v {
            Value::Type(t) => Ok(t),
            _ => Err(EvalError::mismatch(format!("{tv} is not a type"))),
        }
    }

    /// The top `n` values as fields. A bare type is an anonymous field.
    fn pop_fields(&mut self, n: usize) -> EvalResult<Vec<FieldType>> {
        self.pop_values(n)?
            .into_iter()
            .map(|tv| match tv.v {
                Value::Field(f) => Ok(FieldType::clone(&f)),
                Value::Type(t) => Ok(FieldType::new(Name::EMPTY, t)),
                _ => Err(EvalError::mismatch(format!("{tv} is not a field"))),
            })
            .collect()
    }

    // Assignment targets

    /// Evaluate the expression on top of the expression stack to a pointer
    /// at the location it denotes. The blank identifier yields undefined.
    pub(super) fn eval_lvalue(&mut self) -> EvalResult {
        let id = self.peek_expr()?;
        let ast = self.ast;
        match ast.expr(id) {
            ExprKind::Name { name, path } => {
                self.pop_expr()?;
                let target = self.name_target(id.into(), *name, *path)?;
                self.values.push(target);
            }
            ExprKind::Index { x, index } => {
                self.ops.push(Op::LvIndex);
                self.schedule(*index);
                self.schedule(*x);
            }
            ExprKind::Selector { x, .. } => {
                self.ops.push(Op::LvSelector);
                self.schedule(*x);
            }
            ExprKind::Star { x } => {
                self.ops.push(Op::LvStar);
                self.schedule(*x);
            }
            ExprKind::CompositeLit { .. } => {
                // `&T{...}`: build the value, then move it to the heap.
                self.ops.push(Op::HeapAlloc);
                self.ops.push(Op::Eval);
            }
            _ => return Err(self.unexpected_expr(id)),
        }
        Ok(())
    }

    /// Pointer at the slot `path` resolves to from the active block.
    pub(super) fn name_target(
        &self,
        node: NodeId,
        name: Name,
        path: ValuePath,
    ) -> EvalResult<TypedValue> {
        if name.is_blank() {
            return Ok(TypedValue::UNDEFINED);
        }
        if path.is_universe() {
            return Err(EvalError::UnexpectedNode {
                node,
                kind: "predeclared name",
            });
        }
        let slot = SlotRef::resolve(self.last_block(), path)?;
        self.slot_target(slot)
    }

    /// Pointer at `slot`, typed with the slot's declared type.
    pub(super) fn slot_target(&self, slot: SlotRef) -> EvalResult<TypedValue> {
        let ty = self
            .declared_type(&slot)
            .or_else(|| slot.ty())
            .ok_or_else(|| EvalError::mismatch(format!("slot #{} has no type", slot.index)))?;
        Ok(TypedValue::new(
            Type::pointer(ty),
            Value::Pointer(PointerValue::Slot(slot)),
        ))
    }

    /// Static type of `slot`, from the static block its block was
    /// instantiated from. Interface variables keep their interface type here
    /// while the run-time slot carries the dynamic type.
    fn declared_type(&self, slot: &SlotRef) -> Option<Type> {
        let source = slot.block.borrow().source()?;
        let scope = self.ast.scope_of(source)?;
        let block = self.ast.static_block(scope).block()?;
        let t = block.borrow().get(slot.index).and_then(|tv| tv.t.clone());
        t
    }

    pub(super) fn op_lv_index(&mut self) -> EvalResult {
        self.pop_expr()?;
        let index = self.pop_value()?;
        let x = auto_deref(self.pop_value()?)?;
        let (elt, ptr) = match (x.t.as_ref().map(Type::underlying), &x.v) {
            (Some(Type::Array(at)), Value::Array(a)) => {
                let i = checked_index(&index, a.borrow().elems.len())?;
                (
                    at.elt.clone(),
                    PointerValue::Elem {
                        target: a.clone(),
                        index: i,
                    },
                )
            }
            (Some(Type::Slice(st)), Value::Slice(s)) => {
                let i = checked_index(&index, s.len)?;
                (
                    st.elt.clone(),
                    PointerValue::Elem {
                        target: s.base.clone(),
                        index: s.offset + i,
                    },
                )
            }
            (Some(Type::Slice(_)), Value::None) => return Err(out_of_range(&index, 0)),
            (Some(Type::Map(mt)), Value::Map(m)) => (
                mt.value.clone(),
                PointerValue::MapEntry {
                    target: m.clone(),
                    key: Box::new(ops::convert(&index, &mt.key)?),
                },
            ),
            (Some(Type::Map(_)), Value::None) => return Err(EvalError::NilDereference),
            _ => {
                return Err(EvalError::mismatch(format!(
                    "cannot assign to index of {x}"
                )))
            }
        };
        self.values
            .push(TypedValue::new(Type::pointer(elt), Value::Pointer(ptr)));
        Ok(())
    }

    pub(super) fn op_lv_selector(&mut self) -> EvalResult {
        let id = self.pop_expr()?;
        let ast = self.ast;
        let ExprKind::Selector { path, .. } = ast.expr(id) else {
            return Err(self.unexpected_expr(id));
        };
        let x = auto_deref(self.pop_value()?)?;
        let (field, index) = struct_field(&x, *path)?;
        let Value::Struct(target) = &x.v else {
            return Err(EvalError::NilDereference);
        };
        self.values.push(TypedValue::new(
            Type::pointer(field.ty),
            Value::Pointer(PointerValue::Field {
                target: target.clone(),
                index,
            }),
        ));
        Ok(())
    }

    pub(super) fn op_lv_star(&mut self) -> EvalResult {
        self.pop_expr()?;
        let x = self.pop_value()?;
        match &x.v {
            Value::Pointer(_) => {
                self.values.push(x);
                Ok(())
            }
            Value::None => Err(EvalError::NilDereference),
            _ => Err(EvalError::mismatch(format!("invalid indirect of {x}"))),
        }
    }

    /// Move the value on top of the stack to a fresh heap item.
    pub(super) fn op_heap_alloc(&mut self) -> EvalResult {
        let tv = self.pop_value()?;
        let Some(t) = tv.t.clone() else {
            return Err(EvalError::mismatch("cannot take the address of nil"));
        };
        let item = tern_ir::Block::heap_item(tv);
        self.adopt(&item)?;
        self.values.push(TypedValue::new(
            Type::pointer(t),
            Value::Pointer(PointerValue::Slot(SlotRef {
                block: item,
                index: 0,
            })),
        ));
        Ok(())
    }
}

/// Look through a pointer; nil pointers fail.
pub(super) fn auto_deref(x: TypedValue) -> EvalResult<TypedValue> {
    if !matches!(x.t.as_ref().map(Type::underlying), Some(Type::Pointer(_))) {
        return Ok(x);
    }
    match &x.v {
        Value::Pointer(p) => Ok(p.load()),
        _ => Err(EvalError::NilDereference),
    }
}

pub(super) fn checked_index(index: &TypedValue, len: usize) -> EvalResult<usize> {
    let Some(i) = ops::to_i128(index) else {
        return Err(EvalError::mismatch(format!("non-integer index {index}")));
    };
    usize::try_from(i)
        .ok()
        .filter(|&i| i < len)
        .ok_or(EvalError::IndexOutOfRange { index: i, len })
}

fn index_error(index: usize, len: usize) -> EvalError {
    EvalError::IndexOutOfRange {
        index: i128::try_from(index).unwrap_or(i128::MAX),
        len,
    }
}

fn out_of_range(index: &TypedValue, len: usize) -> EvalError {
    EvalError::IndexOutOfRange {
        index: ops::to_i128(index).unwrap_or(i128::MAX),
        len,
    }
}

fn index_value(x: &TypedValue, index: &TypedValue) -> EvalResult<TypedValue> {
    match (x.t.as_ref().map(Type::underlying), &x.v) {
        (Some(Type::Map(mt)), Value::Map(m)) => {
            let key = ops::convert(index, &mt.key)?;
            let found = m.borrow().get(&key)?.cloned();
            Ok(found.unwrap_or_else(|| TypedValue::zero(&mt.value)))
        }
        (Some(Type::Map(mt)), Value::None) => Ok(TypedValue::zero(&mt.value)),
        (_, Value::String(s)) => {
            let i = checked_index(index, s.len())?;
            let byte = s.get(i).copied().unwrap_or_default();
            Ok(TypedValue::new(Type::UINT8, Value::Uint(u64::from(byte))))
        }
        (_, Value::Array(a)) => {
            let a = a.borrow();
            let i = checked_index(index, a.elems.len())?;
            a.elems
                .get(i)
                .cloned()
                .ok_or_else(|| out_of_range(index, a.elems.len()))
        }
        (_, Value::Slice(s)) => {
            let i = checked_index(index, s.len)?;
            s.get(i).ok_or_else(|| out_of_range(index, s.len))
        }
        (Some(Type::Slice(_)), Value::None) => Err(out_of_range(index, 0)),
        _ => Err(EvalError::mismatch(format!("cannot index {x}"))),
    }
}

/// Field or bound method addressed by `path` on `x`.
fn member(x: TypedValue, path: ValuePath) -> EvalResult<TypedValue> {
    let owner = x.t.as_ref().map(method_set_owner).and_then(|t| match t {
        Type::Declared(dt) => Some(Rc::clone(dt)),
        _ => None,
    });
    if let Some(dt) = owner.filter(|_| path.depth == 1) {
        let method = dt.method_at(path)?;
        let Value::Func(func) = &method.func.v else {
            return Err(EvalError::Internal(format!(
                "method {} has no function",
                method.name
            )));
        };
        let t = method.func.t.clone().unwrap_or(Type::BUILTIN);
        let bound = BoundMethod {
            recv: x,
            func: Rc::clone(func),
        };
        return Ok(TypedValue::new(t, Value::BoundMethod(Rc::new(bound))));
    }
    let x = auto_deref(x)?;
    let (_, index) = struct_field(&x, path)?;
    match &x.v {
        Value::Struct(s) => s
            .borrow()
            .fields
            .get(index)
            .cloned()
            .ok_or_else(|| EvalError::Internal(format!("field {path} missing"))),
        _ => Err(EvalError::NilDereference),
    }
}

/// The type whose methods a selector on a value of type `t` sees.
fn method_set_owner(t: &Type) -> &Type {
    match t {
        Type::Pointer(pt) => &pt.elt,
        other => other,
    }
}

/// Field type and index addressed by a depth-1 or depth-2 path on a struct
/// value.
fn struct_field(x: &TypedValue, path: ValuePath) -> EvalResult<(FieldType, usize)> {
    if path.depth == 0 || path.depth > 2 {
        return Err(ValueError::PathDepthTooLarge { path }.into());
    }
    let Some(Type::Struct(st)) = x.t.as_ref().map(Type::underlying) else {
        return Err(EvalError::mismatch(format!(
            "selector {} on non-struct {x}",
            path.name
        )));
    };
    let index = usize::from(path.index);
    let field = st.fields.get(index).cloned().ok_or_else(|| ValueError::UnknownMember {
        name: path.name,
        ty: x.t.as_ref().map_or_else(String::new, ToString::to_string),
    })?;
    Ok((field, index))
}

/// `x[low:high:max]` over an array, slice or string.
fn slice_value(
    x: &TypedValue,
    low: Option<&TypedValue>,
    high: Option<&TypedValue>,
    max: Option<&TypedValue>,
) -> EvalResult<TypedValue> {
    let Some(t) = x.t.clone() else {
        return Err(EvalError::mismatch("cannot slice nil"));
    };
    match (t.underlying(), &x.v) {
        (Type::Primitive(p), Value::String(s)) if p.is_string() => {
            if max.is_some() {
                return Err(EvalError::mismatch("3-index slice of string"));
            }
            let (lo, hi, _) = bounds(low, high, None, s.len(), s.len())?;
            let bytes = s.get(lo..hi).unwrap_or_default();
            let t = if t.is_untyped() { Type::STRING } else { t };
            Ok(TypedValue::new(t, Value::bytes(bytes)))
        }
        (Type::Array(at), Value::Array(a)) => {
            let len = a.borrow().elems.len();
            let (lo, hi, cap) = bounds(low, high, max, len, len)?;
            Ok(TypedValue::new(
                Type::slice(at.elt.clone()),
                Value::Slice(SliceValue {
                    base: a.clone(),
                    offset: lo,
                    len: hi - lo,
                    cap: cap - lo,
                }),
            ))
        }
        (Type::Slice(_), Value::Slice(s)) => {
            let (lo, hi, cap) = bounds(low, high, max, s.len, s.cap)?;
            Ok(TypedValue::new(
                t,
                Value::Slice(SliceValue {
                    base: s.base.clone(),
                    offset: s.offset + lo,
                    len: hi - lo,
                    cap: cap - lo,
                }),
            ))
        }
        (Type::Slice(_), Value::None) => {
            bounds(low, high, max, 0, 0)?;
            Ok(TypedValue::of_type(t))
        }
        _ => Err(EvalError::mismatch(format!("cannot slice {x}"))),
    }
}

/// Resolve slice bounds against `len` and `cap`: `0 <= low <= high <= max <= cap`.
fn bounds(
    low: Option<&TypedValue>,
    high: Option<&TypedValue>,
    max: Option<&TypedValue>,
    len: usize,
    cap: usize,
) -> EvalResult<(usize, usize, usize)> {
    let resolve = |tv: Option<&TypedValue>, default: usize, limit: usize| -> EvalResult<usize> {
        let Some(tv) = tv else {
            return Ok(default);
        };
        match ops::to_i128(tv) {
            Some(i) => usize::try_from(i)
                .ok()
                .filter(|&i| i <= limit)
                .ok_or(EvalError::IndexOutOfRange { index: i, len: limit }),
            None => Err(EvalError::mismatch(format!("non-integer slice index {tv}"))),
        }
    };
    let max = resolve(max, cap, cap)?;
    let high = resolve(high, len.min(max), max)?;
    let low = resolve(low, 0, high)?;
    Ok((low, high, max))
}

/// Elements of an array or slice literal, placed by position or key and
/// padded with zeros. `vals` holds, per element, its key (if any) and then
/// its value.
fn sequence(
    elt: &Type,
    elts: &[tern_ir::KeyValue],
    vals: Vec<TypedValue>,
    len: Option<usize>,
) -> EvalResult<Vec<TypedValue>> {
    let limit = len.unwrap_or(usize::MAX);
    let mut vals = vals.into_iter();
    let mut placed = Vec::with_capacity(elts.len());
    let mut cursor = 0usize;
    let mut size = 0usize;
    for kv in elts {
        if kv.key.is_some() {
            let key = vals
                .next()
                .ok_or(EvalError::StackUnderflow { stack: "value" })?;
            cursor = checked_index(&key, limit)?;
        }
        let v = vals
            .next()
            .ok_or(EvalError::StackUnderflow { stack: "value" })?;
        if cursor >= limit {
            return Err(index_error(cursor, limit));
        }
        placed.push((cursor, ops::convert(&v, elt)?.copy()));
        cursor += 1;
        size = size.max(cursor);
    }
    let mut out: Vec<TypedValue> = std::iter::repeat_with(|| TypedValue::zero(elt))
        .take(len.unwrap_or(size))
        .collect();
    for (i, v) in placed {
        if let Some(slot) = out.get_mut(i) {
            *slot = v;
        }
    }
    Ok(out)
}
