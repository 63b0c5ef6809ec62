//! Operators and conversions on typed values.
//!
//! Pure functions over [`TypedValue`]s: no machine state and no ownership
//! updates. The machine calls them from its combine steps.
//!
//! Fixed-width integers are kept normalized: a signed value is always the
//! sign extension of its low `width` bits, an unsigned value never has bits
//! above its width. Every operation re-normalizes its result, which makes
//! overflow wrap the way two's complement hardware does.

mod binary;
mod convert;
mod unary;

use num_traits::ToPrimitive;
use tern_ir::{Type, TypedValue, Value};

pub use binary::{binary, values_equal};
pub use convert::{convert, default_typed};
pub use unary::unary;

/// Integer payload widened to `i128`; `None` for non-integers and for big
/// integers beyond that range.
pub fn to_i128(tv: &TypedValue) -> Option<i128> {
    match &tv.v {
        Value::Int(n) => Some(i128::from(*n)),
        Value::Uint(n) => Some(i128::from(*n)),
        Value::BigInt(n) => n.to_i128(),
        _ => None,
    }
}

/// Bit width of the fixed-width integer kind of `t`, 64 otherwise.
fn width(t: Option<&Type>) -> u32 {
    t.and_then(Type::primitive)
        .and_then(|p| p.bit_width())
        .unwrap_or(64)
}

#[inline]
fn wrap_signed(v: i64, bits: u32) -> i64 {
    if bits >= 64 {
        v
    } else {
        let shift = 64 - bits;
        (v << shift) >> shift
    }
}

#[inline]
fn wrap_unsigned(v: u64, bits: u32) -> u64 {
    if bits >= 64 {
        v
    } else {
        v & ((1u64 << bits) - 1)
    }
}

/// Reinterpret the bits of a signed integer.
#[inline]
fn bits_of(v: i64) -> u64 {
    u64::from_ne_bytes(v.to_ne_bytes())
}

#[inline]
fn signed_of(v: u64) -> i64 {
    i64::from_ne_bytes(v.to_ne_bytes())
}

fn describe(tv: &TypedValue) -> String {
    match &tv.t {
        Some(t) => t.to_string(),
        None => "nil".to_owned(),
    }
}
