//! Binary operators.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::Zero;
use tern_ir::{BinaryOp, Type, TypedValue, Value};

use super::{convert, describe, to_i128, width, wrap_signed, wrap_unsigned};
use crate::EvalError;

/// Largest shift count accepted on an untyped constant.
const MAX_CONST_SHIFT: u64 = 4096;

/// Apply `op` to two evaluated operands.
///
/// Untyped constant operands first take the type of the other side.
/// Comparisons yield an untyped bool. `&&` and `||` land here only once
/// both sides are known; short-circuiting happens in the machine.
pub fn binary(op: BinaryOp, left: &TypedValue, right: &TypedValue) -> Result<TypedValue, EvalError> {
    if op.is_shift() {
        return shift(op, left, right);
    }
    let (l, r) = balance(left, right)?;
    if op.is_comparison() {
        return compare(op, &l, &r).map(TypedValue::untyped_bool);
    }
    let t = l.t.clone().or_else(|| r.t.clone());
    let bits = width(t.as_ref());
    let v = match (&l.v, &r.v) {
        (Value::BigInt(a), Value::BigInt(b)) => Value::big_int(big_arith(op, a, b)?),
        (Value::Int(a), Value::Int(b)) => Value::Int(wrap_signed(signed_arith(op, *a, *b)?, bits)),
        (Value::Uint(a), Value::Uint(b)) => {
            Value::Uint(wrap_unsigned(unsigned_arith(op, *a, *b)?, bits))
        }
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
            let mut s = Vec::with_capacity(a.len() + b.len());
            s.extend_from_slice(a);
            s.extend_from_slice(b);
            Value::String(Rc::from(s))
        }
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::LogicalAnd => Value::Bool(*a && *b),
            BinaryOp::LogicalOr => Value::Bool(*a || *b),
            _ => return Err(invalid(op, &l, &r)),
        },
        _ => return Err(invalid(op, &l, &r)),
    };
    Ok(TypedValue { t, v })
}

/// Give untyped constant operands the type of the other side. Two untyped
/// integers meet at rune when either is a rune.
fn balance(left: &TypedValue, right: &TypedValue) -> Result<(TypedValue, TypedValue), EvalError> {
    let lu = is_untyped(left);
    let ru = is_untyped(right);
    match (&left.t, &right.t) {
        (Some(lt), Some(rt)) if lu && ru && lt != rt => {
            if *lt == Type::UNTYPED_RUNE && *rt == Type::UNTYPED_BIGINT {
                Ok((left.clone(), convert(right, lt)?))
            } else if *lt == Type::UNTYPED_BIGINT && *rt == Type::UNTYPED_RUNE {
                Ok((convert(left, rt)?, right.clone()))
            } else {
                Ok((left.clone(), right.clone()))
            }
        }
        (Some(_), Some(rt)) if lu && !ru => Ok((convert(left, rt)?, right.clone())),
        (Some(lt), Some(_)) if ru && !lu => Ok((left.clone(), convert(right, lt)?)),
        _ => Ok((left.clone(), right.clone())),
    }
}

fn is_untyped(tv: &TypedValue) -> bool {
    tv.t.as_ref().is_some_and(Type::is_untyped)
}

fn compare(op: BinaryOp, l: &TypedValue, r: &TypedValue) -> Result<bool, EvalError> {
    match op {
        BinaryOp::Eq => return values_equal(&l.v, &r.v),
        BinaryOp::NotEq => return values_equal(&l.v, &r.v).map(|eq| !eq),
        _ => {}
    }
    let ord = match (&l.v, &r.v) {
        (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => return Err(invalid(op, l, r)),
    };
    Ok(match op {
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::LtEq => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        BinaryOp::GtEq => ord.is_ge(),
        _ => return Err(invalid(op, l, r)),
    })
}

/// `==` on payloads.
///
/// Arrays and structs compare element-wise, pointers by target. Slices,
/// maps and functions compare only against nil.
pub fn values_equal(a: &Value, b: &Value) -> Result<bool, EvalError> {
    Ok(match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Uint(x), Value::Uint(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Type(x), Value::Type(y)) => x == y,
        (Value::Pointer(x), Value::Pointer(y)) => x.same_target(y),
        (Value::Struct(x), Value::Struct(y)) => {
            x.ptr_eq(y) || all_equal(&x.borrow().fields, &y.borrow().fields)?
        }
        (Value::Array(x), Value::Array(y)) => {
            x.ptr_eq(y) || all_equal(&x.borrow().elems, &y.borrow().elems)?
        }
        (
            Value::Slice(_) | Value::Map(_) | Value::Func(_) | Value::BoundMethod(_),
            Value::Slice(_) | Value::Map(_) | Value::Func(_) | Value::BoundMethod(_),
        ) => {
            return Err(EvalError::mismatch(
                "slice, map and func values compare only against nil",
            ))
        }
        // Interface values of different dynamic kinds, or nil against a value.
        _ => false,
    })
}

fn all_equal(xs: &[TypedValue], ys: &[TypedValue]) -> Result<bool, EvalError> {
    if xs.len() != ys.len() {
        return Ok(false);
    }
    for (x, y) in xs.iter().zip(ys) {
        if !values_equal(&x.v, &y.v)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn big_arith(op: BinaryOp, a: &BigInt, b: &BigInt) -> Result<BigInt, EvalError> {
    Ok(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Quo if b.is_zero() => return Err(EvalError::DivisionByZero),
        BinaryOp::Quo => a / b,
        BinaryOp::Rem if b.is_zero() => return Err(EvalError::DivisionByZero),
        BinaryOp::Rem => a % b,
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::AndNot => a & &(!b),
        _ => return Err(unsupported_on(op, "integers")),
    })
}

fn signed_arith(op: BinaryOp, a: i64, b: i64) -> Result<i64, EvalError> {
    Ok(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Quo if b == 0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Quo => a.wrapping_div(b),
        BinaryOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Rem => a.wrapping_rem(b),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::AndNot => a & !b,
        _ => return Err(unsupported_on(op, "integers")),
    })
}

fn unsigned_arith(op: BinaryOp, a: u64, b: u64) -> Result<u64, EvalError> {
    Ok(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Quo if b == 0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Quo => a / b,
        BinaryOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Rem => a % b,
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::AndNot => a & !b,
        _ => return Err(unsupported_on(op, "integers")),
    })
}

/// `<<` and `>>`. The result has the type of the left operand.
fn shift(op: BinaryOp, left: &TypedValue, right: &TypedValue) -> Result<TypedValue, EvalError> {
    let count = to_i128(right).ok_or_else(|| {
        EvalError::mismatch(format!("shift count {} is not an integer", right.v))
    })?;
    if count < 0 {
        return Err(EvalError::NegativeShift);
    }
    let count = u64::try_from(count).unwrap_or(u64::MAX);
    let left_shift = op == BinaryOp::Shl;
    let v = match &left.v {
        Value::BigInt(a) => {
            if count > MAX_CONST_SHIFT {
                return Err(EvalError::mismatch(format!(
                    "constant shift count {count} too large"
                )));
            }
            let n = usize::try_from(count).unwrap_or(usize::MAX);
            Value::big_int(if left_shift { &**a << n } else { &**a >> n })
        }
        Value::Int(a) => {
            let v = match (left_shift, count >= 64) {
                (true, true) => 0,
                (true, false) => a << count,
                (false, true) => a >> 63,
                (false, false) => a >> count,
            };
            Value::Int(wrap_signed(v, width(left.t.as_ref())))
        }
        Value::Uint(a) => {
            let v = match (left_shift, count >= 64) {
                (_, true) => 0,
                (true, false) => a << count,
                (false, false) => a >> count,
            };
            Value::Uint(wrap_unsigned(v, width(left.t.as_ref())))
        }
        _ => {
            return Err(EvalError::mismatch(format!(
                "cannot shift {} ({})",
                left.v,
                describe(left)
            )))
        }
    };
    Ok(TypedValue { t: left.t.clone(), v })
}

fn invalid(op: BinaryOp, l: &TypedValue, r: &TypedValue) -> EvalError {
    EvalError::mismatch(format!(
        "invalid operation {} {op} {} ({} and {})",
        l.v,
        r.v,
        describe(l),
        describe(r)
    ))
}

fn unsupported_on(op: BinaryOp, what: &str) -> EvalError {
    EvalError::mismatch(format!("operator {op} not defined on {what}"))
}
