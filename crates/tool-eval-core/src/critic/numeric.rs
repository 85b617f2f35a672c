use super::{CriticScore, Evaluate};
use crate::error::CriticError;
use serde_json::Value;

/// Numeric critic with linear falloff.
///
/// Both values are normalized into `value_range`; the unit score is 1.0
/// while their normalized distance stays within `tolerance` and falls
/// linearly to 0.0 as the distance grows to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericCritic {
    pub value_range: (f64, f64),
    pub match_threshold: f64,
    pub tolerance: f64,
}

impl NumericCritic {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            value_range: (min, max),
            match_threshold: 0.8,
            tolerance: 0.0,
        }
    }

    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Normalized distance that still earns the full score
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Unit score in [0, 1] for a normalized distance
    fn unit_score(&self, distance: f64) -> f64 {
        if distance <= self.tolerance {
            return 1.0;
        }
        (1.0 - (distance - self.tolerance) / (1.0 - self.tolerance)).clamp(0.0, 1.0)
    }
}

fn as_number(value: &Value) -> Result<f64, CriticError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| CriticError::NotNumeric {
            field: "value".to_string(),
            value: value.to_string(),
        })
}

impl Evaluate for NumericCritic {
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError> {
        let (min, max) = self.value_range;
        if min.is_nan() || max.is_nan() || max <= min {
            return Err(CriticError::Config(format!(
                "value_range ({min}, {max}) must have max > min"
            )));
        }
        if !(0.0..1.0).contains(&self.tolerance) {
            return Err(CriticError::Config(format!(
                "tolerance {} must be in [0, 1)",
                self.tolerance
            )));
        }

        let span = max - min;
        let expected = (as_number(expected)? - min) / span;
        let actual = (as_number(actual)? - min) / span;

        let unit = self.unit_score((expected - actual).abs());
        Ok(CriticScore {
            matched: unit >= self.match_threshold,
            score: unit * weight,
        })
    }
}
