//! Conversions, explicit (`T(x)`) and implicit (untyped constants taking
//! the type of their destination).

use num_bigint::{BigInt, Sign};
use tern_ir::{ArrayValue, PrimitiveType, SliceValue, Type, TypedValue, Value};
use tern_realm::ObjectCell;

use super::{bits_of, describe, signed_of, to_i128, wrap_signed, wrap_unsigned};
use crate::EvalError;

/// Convert `tv` to `to`.
///
/// Interface targets keep the dynamic type; untyped constants become their
/// default type. Untyped nil becomes the typed nil of a nilable target.
pub fn convert(tv: &TypedValue, to: &Type) -> Result<TypedValue, EvalError> {
    if to.is_interface() {
        return default_typed(tv);
    }
    if tv.t.is_none() {
        if tv.v.is_none() && to.is_nilable() {
            return Ok(TypedValue::of_type(to.clone()));
        }
        return Err(cannot(tv, to));
    }
    let v = match to.underlying() {
        Type::Primitive(p) if p.is_integer() => integer(tv, *p).ok_or_else(|| cannot(tv, to))?,
        Type::Primitive(p) if p.is_string() => string(tv).ok_or_else(|| cannot(tv, to))?,
        Type::Primitive(p) if p.is_bool() => match tv.v {
            Value::Bool(b) => Value::Bool(b),
            _ => return Err(cannot(tv, to)),
        },
        Type::Slice(st) if st.elt.primitive() == Some(PrimitiveType::Uint8) => match &tv.v {
            Value::String(s) => bytes(s),
            _ if same_underlying(tv, to) => tv.v.clone(),
            _ => return Err(cannot(tv, to)),
        },
        _ if same_underlying(tv, to) => tv.v.clone(),
        _ => return Err(cannot(tv, to)),
    };
    Ok(TypedValue::new(to.clone(), v))
}

/// `tv` with untyped constants given their default type.
pub fn default_typed(tv: &TypedValue) -> Result<TypedValue, EvalError> {
    match &tv.t {
        Some(Type::Primitive(p)) if p.is_untyped() => {
            convert(tv, &Type::Primitive(p.default_type()))
        }
        _ => Ok(tv.clone()),
    }
}

fn same_underlying(tv: &TypedValue, to: &Type) -> bool {
    tv.t.as_ref().is_some_and(|t| t.underlying() == to.underlying())
}

fn cannot(tv: &TypedValue, to: &Type) -> EvalError {
    EvalError::mismatch(format!("cannot convert {} ({}) to {to}", tv.v, describe(tv)))
}

/// Integer conversion: keep the low bits and re-normalize to the target
/// width.
fn integer(tv: &TypedValue, to: PrimitiveType) -> Option<Value> {
    if to == PrimitiveType::UntypedBigint {
        let n = match &tv.v {
            Value::Int(n) => BigInt::from(*n),
            Value::Uint(n) => BigInt::from(*n),
            Value::BigInt(n) => BigInt::clone(n),
            _ => return None,
        };
        return Some(Value::big_int(n));
    }
    let raw = match &tv.v {
        Value::Int(n) => bits_of(*n),
        Value::Uint(n) => *n,
        Value::BigInt(n) => low_bits(n),
        _ => return None,
    };
    let bits = to.bit_width().unwrap_or(64);
    Some(if to.is_unsigned() {
        Value::Uint(wrap_unsigned(raw, bits))
    } else {
        Value::Int(wrap_signed(signed_of(raw), bits))
    })
}

/// Low 64 bits of the two's complement form of `n`.
fn low_bits(n: &BigInt) -> u64 {
    let (sign, digits) = n.to_u64_digits();
    let magnitude = digits.first().copied().unwrap_or(0);
    if sign == Sign::Minus {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }
}

fn string(tv: &TypedValue) -> Option<Value> {
    match &tv.v {
        Value::String(s) => Some(Value::String(s.clone())),
        Value::Int(_) | Value::Uint(_) | Value::BigInt(_) => {
            let c = to_i128(tv)
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            Some(Value::string(c.encode_utf8(&mut [0; 4])))
        }
        Value::Slice(s) => {
            let bytes: Option<Vec<u8>> = s
                .to_vec()
                .iter()
                .map(|b| match b.v {
                    Value::Uint(n) => u8::try_from(n).ok(),
                    _ => None,
                })
                .collect();
            Some(Value::bytes(&bytes?))
        }
        Value::None => Some(Value::string("")),
        _ => None,
    }
}

fn bytes(s: &[u8]) -> Value {
    let elems = s
        .iter()
        .map(|&b| TypedValue::new(Type::UINT8, Value::Uint(u64::from(b))))
        .collect();
    Value::Slice(SliceValue::over(ObjectCell::new(ArrayValue::new(elems))))
}
