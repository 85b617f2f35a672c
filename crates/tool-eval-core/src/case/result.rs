use crate::critic::CriticScore;
use crate::naming::compare_tool_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name under which tool-name scoring is recorded
pub const TOOL_SELECTION_FIELD: &str = "tool_selection";

/// Score of one field for one matched pair of calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    pub field: String,
    #[serde(rename = "match")]
    pub matched: bool,
    pub score: f64,
    pub weight: f64,
    pub expected: Value,
    pub actual: Value,
}

/// Outcome of evaluating one case against one set of actual calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub passed: bool,
    pub warning: bool,
    pub results: Vec<FieldResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl EvaluationResult {
    /// Short-circuited failure with a zero score
    pub fn failed(reason: String) -> Self {
        Self {
            failure_reason: Some(reason),
            ..Self::default()
        }
    }

    /// Trivially passing result with a full score
    pub fn trivial_pass() -> Self {
        Self {
            score: 1.0,
            passed: true,
            ..Self::default()
        }
    }

    /// Failed outright, not merely warned
    pub fn fail(&self) -> bool {
        !self.passed && !self.warning
    }

    pub fn warn(&self) -> bool {
        self.warning
    }

    pub fn add(
        &mut self,
        field: &str,
        outcome: CriticScore,
        weight: f64,
        expected: Value,
        actual: Value,
    ) {
        self.results.push(FieldResult {
            field: field.to_string(),
            matched: outcome.matched,
            score: outcome.score,
            weight,
            expected,
            actual,
        });
    }

    /// Record tool-name scoring for one pair and return its score
    pub fn score_tool_selection(&mut self, expected: &str, actual: &str, weight: f64) -> f64 {
        let outcome = if compare_tool_name(expected, actual) {
            CriticScore::full(weight)
        } else {
            CriticScore::miss()
        };
        self.add(
            TOOL_SELECTION_FIELD,
            outcome,
            weight,
            Value::String(expected.to_string()),
            Value::String(actual.to_string()),
        );
        outcome.score
    }

    /// Normalize the recorded scores by `total_weight`, clamped to [0, 1]
    pub fn compute_final_score(&mut self, total_weight: f64) {
        let total_score: f64 = self
            .results
            .iter()
            .map(|r| r.score)
            .filter(|s| s.is_finite())
            .sum();
        self.score = if total_weight > 0.0 {
            (total_score / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}
