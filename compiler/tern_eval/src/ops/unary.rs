//! Unary operators.

use tern_ir::{TypedValue, UnaryOp, Value};

use super::{describe, width, wrap_signed, wrap_unsigned};
use crate::EvalError;

pub fn unary(op: UnaryOp, x: &TypedValue) -> Result<TypedValue, EvalError> {
    let bits = width(x.t.as_ref());
    let v = match (op, &x.v) {
        (UnaryOp::Recv, _) => {
            return Err(EvalError::Unsupported {
                feature: "channel receive",
            })
        }
        (UnaryOp::Pos, Value::Int(_) | Value::Uint(_) | Value::BigInt(_)) => x.v.clone(),
        (UnaryOp::Neg, Value::BigInt(n)) => Value::big_int(-&**n),
        (UnaryOp::Neg, Value::Int(n)) => Value::Int(wrap_signed(n.wrapping_neg(), bits)),
        (UnaryOp::Neg, Value::Uint(n)) => Value::Uint(wrap_unsigned(n.wrapping_neg(), bits)),
        (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
        (UnaryOp::BitNot, Value::BigInt(n)) => Value::big_int(!&**n),
        (UnaryOp::BitNot, Value::Int(n)) => Value::Int(wrap_signed(!n, bits)),
        (UnaryOp::BitNot, Value::Uint(n)) => Value::Uint(wrap_unsigned(!n, bits)),
        _ => {
            return Err(EvalError::mismatch(format!(
                "invalid operation {op}{} ({})",
                x.v,
                describe(x)
            )))
        }
    };
    Ok(TypedValue { t: x.t.clone(), v })
}
