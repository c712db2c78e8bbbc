//! Lenient conversions from loosely-typed JSON values.
//!
//! Numbers may arrive as JSON numbers, numeric strings, or junk such as `"N/A"`.
//! Anything that does not parse becomes `None` instead of an error.

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::Value;

const MAX_EXPONENT: u32 = 64;

/// Render any JSON value as text. Strings are taken as-is, everything else uses its
/// JSON spelling (`42`, `true`, `null`).
pub fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a decimal from a JSON number or numeric string.
pub fn parse_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => decimal_from_str(&n.to_string()),
        Value::String(s) => decimal_from_str(s.trim()),
        _ => None,
    }
}

/// Parse a 64-bit integer from a JSON number or numeric string.
///
/// Fractional values are truncated toward zero; values outside the `i64` range are
/// unparseable.
pub fn parse_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(f64_to_i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| decimal_from_str(s).and_then(|d| d.trunc().to_i64()))
        }
        _ => None,
    }
}

fn decimal_from_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).ok().or_else(|| decimal_from_scientific(s))
}

fn decimal_from_scientific(s: &str) -> Option<Decimal> {
    // Bound the exponent first; absurd exponents are junk, not numbers.
    let (_, exp) = s.split_once(['e', 'E'])?;
    let exp: i32 = exp.parse().ok()?;
    if exp.unsigned_abs() > MAX_EXPONENT {
        return None;
    }
    Decimal::from_scientific(s).ok()
}

fn f64_to_i64(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    let t = f.trunc();
    (i64::MIN as f64..i64::MAX as f64)
        .contains(&t)
        .then_some(t as i64)
}
