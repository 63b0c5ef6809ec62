//! Decoding of basic literal text.
//!
//! Literal nodes carry their source text verbatim. Integers decode to
//! arbitrary precision; strings and characters are unquoted with Go escape
//! rules.

use num_bigint::BigInt;

use crate::{LitKind, ValueError};

fn malformed(kind: LitKind, text: &str, reason: &'static str) -> ValueError {
    ValueError::MalformedLiteral {
        kind,
        text: text.to_owned(),
        reason,
    }
}

/// Parse an integer literal. Accepts `0x`, `0o`, `0b`, legacy leading-zero
/// octal, and `_` digit separators.
pub fn parse_int(text: &str) -> Result<BigInt, ValueError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() {
        return Err(malformed(LitKind::Int, text, "no digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(malformed(LitKind::Int, text, "invalid digit"));
    }
    BigInt::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| malformed(LitKind::Int, text, "invalid digit"))
}

/// Unquote a string literal: interpreted (`"..."`) or raw (`` `...` ``).
///
/// The result is a byte string; `\x` and octal escapes may produce bytes
/// that are not valid UTF-8.
pub fn unquote_string(text: &str) -> Result<Vec<u8>, ValueError> {
    if let Some(raw) = text
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Ok(raw.bytes().filter(|&b| b != b'\r').collect());
    }
    let body = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| text.len() >= 2)
        .ok_or_else(|| malformed(LitKind::String, text, "missing quotes"))?;

    let mut out = Vec::with_capacity(body.len());
    let mut rest = body;
    while let Some(c) = rest.chars().next() {
        match c {
            '"' => return Err(malformed(LitKind::String, text, "unescaped quote")),
            '\n' => return Err(malformed(LitKind::String, text, "newline in string")),
            '\\' => {
                let (unit, tail) = decode_escape(&rest[1..], '"', LitKind::String, text)?;
                unit.append_to(&mut out);
                rest = tail;
            }
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    Ok(out)
}

/// Unquote a character literal to its code point value.
pub fn unquote_char(text: &str) -> Result<u32, ValueError> {
    let body = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .filter(|_| text.len() >= 2)
        .ok_or_else(|| malformed(LitKind::Char, text, "missing quotes"))?;
    let (value, tail) = match body.chars().next() {
        None => return Err(malformed(LitKind::Char, text, "empty character literal")),
        Some('\\') => {
            let (unit, tail) = decode_escape(&body[1..], '\'', LitKind::Char, text)?;
            (unit.code_point(), tail)
        }
        Some('\'') => return Err(malformed(LitKind::Char, text, "unescaped quote")),
        Some(c) => (u32::from(c), &body[c.len_utf8()..]),
    };
    if !tail.is_empty() {
        return Err(malformed(LitKind::Char, text, "more than one character"));
    }
    Ok(value)
}

/// One decoded escape: either a raw byte or a code point.
enum Unit {
    Byte(u8),
    Char(char),
}

impl Unit {
    fn append_to(&self, out: &mut Vec<u8>) {
        match *self {
            Unit::Byte(b) => out.push(b),
            Unit::Char(c) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    fn code_point(&self) -> u32 {
        match *self {
            Unit::Byte(b) => u32::from(b),
            Unit::Char(c) => u32::from(c),
        }
    }
}

/// Decode the escape following a backslash.
fn decode_escape<'a>(
    s: &'a str,
    quote: char,
    kind: LitKind,
    text: &str,
) -> Result<(Unit, &'a str), ValueError> {
    let c = s
        .chars()
        .next()
        .ok_or_else(|| malformed(kind, text, "trailing backslash"))?;
    let rest = &s[c.len_utf8()..];
    let simple = match c {
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0c'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0b'),
        '\\' => Some('\\'),
        c if c == quote => Some(c),
        _ => None,
    };
    if let Some(ch) = simple {
        return Ok((Unit::Char(ch), rest));
    }
    match c {
        'x' => {
            let v = hex_digits(rest, 2, kind, text)?;
            let byte = u8::try_from(v).map_err(|_| malformed(kind, text, "escape out of range"))?;
            Ok((Unit::Byte(byte), &rest[2..]))
        }
        'u' | 'U' => {
            let n = if c == 'u' { 4 } else { 8 };
            let v = hex_digits(rest, n, kind, text)?;
            let ch = char::from_u32(v).ok_or_else(|| malformed(kind, text, "invalid code point"))?;
            Ok((Unit::Char(ch), &rest[n..]))
        }
        '0'..='7' => {
            let digits = s
                .get(..3)
                .filter(|d| d.bytes().all(|b| matches!(b, b'0'..=b'7')))
                .ok_or_else(|| malformed(kind, text, "invalid octal escape"))?;
            let v = u32::from_str_radix(digits, 8)
                .map_err(|_| malformed(kind, text, "invalid octal escape"))?;
            let byte = u8::try_from(v).map_err(|_| malformed(kind, text, "escape out of range"))?;
            Ok((Unit::Byte(byte), &s[3..]))
        }
        _ => Err(malformed(kind, text, "unknown escape")),
    }
}

fn hex_digits(s: &str, n: usize, kind: LitKind, text: &str) -> Result<u32, ValueError> {
    let digits = s
        .get(..n)
        .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| malformed(kind, text, "invalid hex escape"))?;
    u32::from_str_radix(digits, 16).map_err(|_| malformed(kind, text, "invalid hex escape"))
}
