//! Condition operators and their evaluation.
//!
//! Evaluation is pure and local: no network, no graph access, never fails.
//! Operand coercion follows the editor's original scripting semantics:
//! numeric comparisons parse the longest leading float prefix (NaN compares
//! false), `contains` works on the operands' string forms, and loose
//! equality compares numerically when both sides look numeric.
//!
//! Operands arrive as optional JSON values; `None` models an absent
//! (undefined) operand and is distinct from JSON null only where the
//! original semantics distinguish them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Comparison operator of a condition node.
///
/// Unrecognized operator tags deserialize to `Unknown`, which evaluates to
/// false rather than failing the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    #[default]
    Equals,
    StrictEquals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    IsEmpty,
    IsNotEmpty,
    IsTrue,
    IsFalse,
    #[serde(other)]
    Unknown,
}

impl ConditionOperator {
    /// Returns true for unary operators that only inspect operand A.
    #[must_use]
    pub const fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::IsEmpty | Self::IsNotEmpty | Self::IsTrue | Self::IsFalse
        )
    }
}

/// Evaluates `a <operator> b`.
#[must_use]
pub fn evaluate(operator: ConditionOperator, a: Option<&JsonValue>, b: Option<&JsonValue>) -> bool {
    match operator {
        ConditionOperator::Equals => loose_eq(a, b),
        ConditionOperator::StrictEquals => strict_eq(a, b),
        ConditionOperator::NotEquals => !loose_eq(a, b),
        ConditionOperator::GreaterThan => parse_float(a) > parse_float(b),
        ConditionOperator::LessThan => parse_float(a) < parse_float(b),
        ConditionOperator::GreaterOrEqual => parse_float(a) >= parse_float(b),
        ConditionOperator::LessOrEqual => parse_float(a) <= parse_float(b),
        ConditionOperator::Contains => display_string(a).contains(&display_string(b)),
        ConditionOperator::IsEmpty => is_empty(a),
        ConditionOperator::IsNotEmpty => !is_empty(a),
        ConditionOperator::IsTrue => is_true(a),
        ConditionOperator::IsFalse => is_false(a),
        ConditionOperator::Unknown => false,
    }
}

fn is_empty(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn is_true(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::Bool(true)) => true,
        Some(JsonValue::Number(n)) => n.as_f64() == Some(1.0),
        Some(JsonValue::String(s)) => s == "true" || s == "1",
        _ => false,
    }
}

fn is_false(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::Bool(false)) => true,
        Some(JsonValue::Number(n)) => n.as_f64() == Some(0.0),
        Some(JsonValue::String(s)) => s == "false" || s == "0",
        _ => false,
    }
}

fn strict_eq(a: Option<&JsonValue>, b: Option<&JsonValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn loose_eq(a: Option<&JsonValue>, b: Option<&JsonValue>) -> bool {
    let a_nullish = matches!(a, None | Some(JsonValue::Null));
    let b_nullish = matches!(b, None | Some(JsonValue::Null));
    if a_nullish || b_nullish {
        return a_nullish && b_nullish;
    }

    let num_a = loose_number(a);
    let num_b = loose_number(b);
    if let (Some(na), Some(nb)) = (num_a, num_b) {
        return na == nb;
    }

    display_string(a) == display_string(b)
}

/// Numeric view of an operand for loose comparison: numbers as-is, booleans
/// as 0/1, strings only when they parse as a number in full.
fn loose_number(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse-float semantics: the longest leading float prefix of the operand's
/// string form, NaN when there is none.
fn parse_float(value: Option<&JsonValue>) -> f64 {
    match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(JsonValue::String(s)) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut saw_digits = end > int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || saw_digits {
            end = frac_end;
            saw_digits = saw_digits || frac_end > frac_start;
        }
    }
    if !saw_digits {
        return f64::NAN;
    }
    // Optional exponent, only kept when complete.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// String form of an operand, matching the editor's display coercion.
fn display_string(value: Option<&JsonValue>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(JsonValue::Null) => "null".to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
