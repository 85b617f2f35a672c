//! Critics score one argument field of a tool call.
//!
//! A [`Critic`] pairs the field it scores and its weight with a
//! [`CriticKind`] that does the comparison. Every kind implements
//! [`Evaluate`], which receives the already-resolved weight and returns a
//! score in `[0, weight]`.

mod binary;
mod datetime;
mod numeric;
mod similarity;
pub mod weights;

#[cfg(test)]
mod tests;

pub use binary::BinaryCritic;
pub use datetime::DatetimeCritic;
pub use numeric::NumericCritic;
pub use similarity::SimilarityCritic;
pub use weights::{validate_and_normalize_critic_weights, FuzzyWeight, Weight};

use crate::error::CriticError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Outcome of comparing one expected value with one actual value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticScore {
    #[serde(rename = "match")]
    pub matched: bool,
    pub score: f64,
}

impl CriticScore {
    /// Full score for a match
    pub fn full(weight: f64) -> Self {
        Self {
            matched: true,
            score: weight,
        }
    }

    /// Zero score, no match
    pub fn miss() -> Self {
        Self {
            matched: false,
            score: 0.0,
        }
    }
}

/// Comparison logic shared by every critic kind.
pub trait Evaluate: Send + Sync {
    /// Compare `expected` against `actual`, scaling the result by `weight`.
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError>;
}

/// Adapter turning a closure into an [`Evaluate`] implementation
pub struct FnEvaluator<F>(pub F);

impl<F> Evaluate for FnEvaluator<F>
where
    F: Fn(&Value, &Value, f64) -> Result<CriticScore, CriticError> + Send + Sync,
{
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError> {
        (self.0)(expected, actual, weight)
    }
}

/// The closed set of built-in critics plus an escape hatch for custom logic
#[derive(Clone)]
pub enum CriticKind {
    Binary(BinaryCritic),
    Numeric(NumericCritic),
    Datetime(DatetimeCritic),
    Similarity(SimilarityCritic),
    /// Placeholder for unconstrained fields; always a full-score match
    None,
    Custom(Arc<dyn Evaluate>),
}

impl CriticKind {
    /// Short name used in reports and logs
    pub fn name(&self) -> &'static str {
        match self {
            CriticKind::Binary(_) => "binary",
            CriticKind::Numeric(_) => "numeric",
            CriticKind::Datetime(_) => "datetime",
            CriticKind::Similarity(_) => "similarity",
            CriticKind::None => "none",
            CriticKind::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for CriticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticKind::Binary(c) => f.debug_tuple("Binary").field(c).finish(),
            CriticKind::Numeric(c) => f.debug_tuple("Numeric").field(c).finish(),
            CriticKind::Datetime(c) => f.debug_tuple("Datetime").field(c).finish(),
            CriticKind::Similarity(c) => f.debug_tuple("Similarity").field(c).finish(),
            CriticKind::None => f.write_str("None"),
            CriticKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Evaluate for CriticKind {
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError> {
        match self {
            CriticKind::Binary(c) => c.evaluate(expected, actual, weight),
            CriticKind::Numeric(c) => c.evaluate(expected, actual, weight),
            CriticKind::Datetime(c) => c.evaluate(expected, actual, weight),
            CriticKind::Similarity(c) => c.evaluate(expected, actual, weight),
            CriticKind::None => Ok(CriticScore::full(weight)),
            CriticKind::Custom(c) => c.evaluate(expected, actual, weight),
        }
    }
}

/// A critic bound to one argument field
#[derive(Debug, Clone)]
pub struct Critic {
    field: String,
    weight: Weight,
    resolved_weight: f64,
    kind: CriticKind,
}

impl Critic {
    /// Create a critic of any kind. The resolved weight starts at the
    /// weight's raw value and is replaced during normalization.
    pub fn new(field: impl Into<String>, weight: impl Into<Weight>, kind: CriticKind) -> Self {
        let weight = weight.into();
        Self {
            field: field.into(),
            resolved_weight: weight.raw_value(),
            weight,
            kind,
        }
    }

    /// Exact-match critic
    pub fn binary(field: impl Into<String>, weight: impl Into<Weight>) -> Self {
        Self::new(field, weight, CriticKind::Binary(BinaryCritic))
    }

    /// Numeric critic normalizing both values into `value_range`
    pub fn numeric(
        field: impl Into<String>,
        weight: impl Into<Weight>,
        critic: NumericCritic,
    ) -> Self {
        Self::new(field, weight, CriticKind::Numeric(critic))
    }

    /// Datetime critic with tolerance and max difference
    pub fn datetime(
        field: impl Into<String>,
        weight: impl Into<Weight>,
        critic: DatetimeCritic,
    ) -> Self {
        Self::new(field, weight, CriticKind::Datetime(critic))
    }

    /// Fuzzy text critic
    pub fn similarity(
        field: impl Into<String>,
        weight: impl Into<Weight>,
        critic: SimilarityCritic,
    ) -> Self {
        Self::new(field, weight, CriticKind::Similarity(critic))
    }

    /// Zero-weight placeholder for a field nobody constrains
    pub fn none(field: impl Into<String>) -> Self {
        Self::new(field, 0.0, CriticKind::None)
    }

    /// Critic backed by caller-supplied logic
    pub fn custom(
        field: impl Into<String>,
        weight: impl Into<Weight>,
        evaluator: Arc<dyn Evaluate>,
    ) -> Self {
        Self::new(field, weight, CriticKind::Custom(evaluator))
    }

    /// Critic backed by a closure
    pub fn custom_fn<F>(field: impl Into<String>, weight: impl Into<Weight>, f: F) -> Self
    where
        F: Fn(&Value, &Value, f64) -> Result<CriticScore, CriticError> + Send + Sync + 'static,
    {
        Self::custom(field, weight, Arc::new(FnEvaluator(f)))
    }

    pub fn critic_field(&self) -> &str {
        &self.field
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Weight actually applied during scoring
    pub fn resolved_weight(&self) -> f64 {
        self.resolved_weight
    }

    pub(crate) fn set_resolved_weight(&mut self, weight: f64) {
        self.resolved_weight = weight;
    }

    pub fn kind(&self) -> &CriticKind {
        &self.kind
    }

    /// Score one field pair using the resolved weight
    pub fn evaluate(&self, expected: &Value, actual: &Value) -> Result<CriticScore, CriticError> {
        self.kind.evaluate(expected, actual, self.resolved_weight)
    }
}

/// Render a JSON value as plain text for text-based comparisons
pub(crate) fn value_as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_as_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
