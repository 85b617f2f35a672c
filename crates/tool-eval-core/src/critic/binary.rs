use super::{CriticScore, Evaluate};
use crate::error::CriticError;
use serde_json::{Number, Value};

/// Exact-match critic: full weight when the values are equal, zero otherwise.
///
/// The actual value is first coerced to the expected value's JSON type, so a
/// model answering `"5"` for an expected `5` still matches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BinaryCritic;

impl Evaluate for BinaryCritic {
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError> {
        let actual = cast_to_type_of(expected, actual);
        if values_equal(expected, &actual) {
            Ok(CriticScore::full(weight))
        } else {
            Ok(CriticScore::miss())
        }
    }
}

fn cast_to_type_of(expected: &Value, actual: &Value) -> Value {
    match (expected, actual) {
        (Value::Number(_), Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| actual.clone()),
        (Value::Bool(_), Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => actual.clone(),
        },
        (Value::String(_), Value::Number(n)) => Value::String(n.to_string()),
        (Value::String(_), Value::Bool(b)) => Value::String(b.to_string()),
        _ => actual.clone(),
    }
}

/// Structural equality that compares numbers by value (`5 == 5.0`)
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
