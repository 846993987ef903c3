//! Orderings used to give canonical trees a deterministic sequence form.

use std::cmp::Ordering;

use serde_json::{Number, Value};

/// String form of a record id, as used for `Keyed` entry keys.
///
/// Strings are taken verbatim; numbers and booleans use their JSON text.
/// `null`, arrays and objects cannot key a record.
pub fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Total order over optional record ids.
///
/// A missing or unusable id sorts first. Present ids compare
/// lexicographically by their [`id_key`] form, so `"10" < "9"`.
pub fn id_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.and_then(id_key);
    let b = b.and_then(id_key);
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// 2^64, the first float above every `u64`.
const INT_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Exact numeric view of a JSON number.
#[derive(Clone, Copy)]
enum Numeric {
    Int(i128),
    Float(f64),
}

fn numeric(n: &Number) -> Numeric {
    if let Some(i) = n.as_i64() {
        Numeric::Int(i.into())
    } else if let Some(u) = n.as_u64() {
        Numeric::Int(u.into())
    } else {
        Numeric::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Compares an integer with a float without rounding either.
fn int_float_cmp(int: i128, float: f64) -> Ordering {
    if float.is_nan() || float >= INT_BOUND {
        return Ordering::Less;
    }
    if float < -INT_BOUND {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        other => other,
    }
}

/// Total order over JSON numbers: by exact value, then integers before
/// floats, then by text (`-0.0` before `0.0`).
pub fn number_cmp(x: &Number, y: &Number) -> Ordering {
    let by_value = match (numeric(x), numeric(y)) {
        (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
        (Numeric::Float(a), Numeric::Float(b)) => {
            a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
        }
        (Numeric::Int(a), Numeric::Float(b)) => int_float_cmp(a, b),
        (Numeric::Float(a), Numeric::Int(b)) => int_float_cmp(b, a).reverse(),
    };
    by_value
        .then_with(|| x.is_f64().cmp(&y.is_f64()))
        .then_with(|| x.to_string().cmp(&y.to_string()))
}

/// Natural order for scalar set members: `null < bool < number < string`,
/// numbers by [`number_cmp`], strings by code point.
pub fn scalar_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => number_cmp(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
