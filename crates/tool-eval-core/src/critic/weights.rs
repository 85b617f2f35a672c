//! Critic weights: explicit numbers or fuzzy importance levels.

use super::Critic;
use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Qualitative importance of a field, converted to a relative weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyWeight {
    Minimal,
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    Critical,
}

impl FuzzyWeight {
    /// Relative level (1-7) before normalization
    pub fn level(self) -> f64 {
        match self {
            FuzzyWeight::Minimal => 1.0,
            FuzzyWeight::VeryLow => 2.0,
            FuzzyWeight::Low => 3.0,
            FuzzyWeight::Medium => 4.0,
            FuzzyWeight::High => 5.0,
            FuzzyWeight::VeryHigh => 6.0,
            FuzzyWeight::Critical => 7.0,
        }
    }
}

/// Weight as written by the case author
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    Value(f64),
    Fuzzy(FuzzyWeight),
}

impl Weight {
    /// Numeric value before normalization
    pub fn raw_value(self) -> f64 {
        match self {
            Weight::Value(v) => v,
            Weight::Fuzzy(f) => f.level(),
        }
    }

    pub fn is_fuzzy(self) -> bool {
        matches!(self, Weight::Fuzzy(_))
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Weight::Value(value)
    }
}

impl From<FuzzyWeight> for Weight {
    fn from(value: FuzzyWeight) -> Self {
        Weight::Fuzzy(value)
    }
}

/// Validate critic weights and set each critic's resolved weight.
///
/// Numeric weights must be finite and non-negative and resolve to
/// themselves. Fuzzy weights resolve to `level / sum(levels)` across the
/// fuzzy critics, so together they sum to 1.0. A case may not mix fuzzy
/// weights with non-zero numeric weights; zero-weight placeholders are
/// exempt.
pub fn validate_and_normalize_critic_weights(critics: &mut [Critic]) -> Result<()> {
    for critic in critics.iter() {
        if let Weight::Value(v) = critic.weight() {
            if !v.is_finite() || v < 0.0 {
                return Err(EvalError::InvalidWeights(format!(
                    "critic for field '{}' has weight {}; weights must be finite and >= 0",
                    critic.critic_field(),
                    v
                )));
            }
        }
    }

    let has_fuzzy = critics.iter().any(|c| c.weight().is_fuzzy());
    let has_numeric = critics
        .iter()
        .any(|c| matches!(c.weight(), Weight::Value(v) if v > 0.0));

    if has_fuzzy && has_numeric {
        return Err(EvalError::InvalidWeights(
            "cannot mix fuzzy weights and numeric weights in one case".to_string(),
        ));
    }

    if !has_fuzzy {
        for critic in critics.iter_mut() {
            let value = critic.weight().raw_value();
            critic.set_resolved_weight(value);
        }
        return Ok(());
    }

    let total: f64 = critics
        .iter()
        .filter(|c| c.weight().is_fuzzy())
        .map(|c| c.weight().raw_value())
        .sum();

    for critic in critics.iter_mut() {
        let resolved = match critic.weight() {
            Weight::Fuzzy(f) => f.level() / total,
            Weight::Value(v) => v,
        };
        critic.set_resolved_weight(resolved);
    }

    Ok(())
}
