//! Evaluation cases and the scoring of one set of actual tool calls
//!
//! A case short-circuits on a wrong call count or wrong tool selection,
//! then pairs expected and actual calls optimally and scores every critic
//! on the matched pairs.

mod result;
#[cfg(test)]
mod tests;

pub use result::{EvaluationResult, FieldResult, TOOL_SELECTION_FIELD};

use crate::critic::{validate_and_normalize_critic_weights, Critic, CriticScore};
use crate::error::{EvalError, Result};
use crate::matcher::{padded_score_matrix, real_pairs, solve_max_assignment};
use crate::naming::{comparison_key, compare_tool_name};
use crate::registry::{Args, ToolDefinition};
use crate::rubric::EvalRubric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A tool invocation: either produced by a model or expected by a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Args,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Args) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Expected call after name resolution and default filling
pub type NamedExpectedToolCall = ToolCall;

/// Expected call as written by the case author
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedToolCall {
    /// Reference by tool name, as registered in the suite
    Named { tool_name: String, args: Args },
    /// Reference by native definition; defaults come from its signature
    Native { tool: ToolDefinition, args: Args },
}

impl ExpectedToolCall {
    pub fn named(tool_name: impl Into<String>, args: Args) -> Self {
        ExpectedToolCall::Named {
            tool_name: tool_name.into(),
            args,
        }
    }

    pub fn native(tool: ToolDefinition, args: Args) -> Self {
        ExpectedToolCall::Native { tool, args }
    }
}

/// One scenario: a prompt, the calls it should produce, and how to score them
#[derive(Debug, Clone)]
pub struct EvalCase {
    pub name: String,
    pub system_message: String,
    pub user_message: String,
    pub expected_tool_calls: Vec<NamedExpectedToolCall>,
    pub critics: Vec<Critic>,
    pub additional_messages: Vec<Value>,
    pub rubric: EvalRubric,
}

impl EvalCase {
    /// Create a case, rejecting duplicate critic fields and invalid weights
    pub fn new(
        name: impl Into<String>,
        user_message: impl Into<String>,
        expected_tool_calls: Vec<NamedExpectedToolCall>,
        mut critics: Vec<Critic>,
    ) -> Result<Self> {
        let name = name.into();
        validate_unique_critic_fields(&critics, &name)?;
        validate_and_normalize_critic_weights(&mut critics)?;

        Ok(Self {
            name,
            system_message: String::new(),
            user_message: user_message.into(),
            expected_tool_calls,
            critics,
            additional_messages: Vec::new(),
            rubric: EvalRubric::default(),
        })
    }

    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    pub fn with_rubric(mut self, rubric: EvalRubric) -> Self {
        self.rubric = rubric;
        self
    }

    pub fn with_additional_messages(mut self, messages: Vec<Value>) -> Self {
        self.additional_messages = messages;
        self
    }

    /// True when the rubric demands an exact count and the counts differ
    pub fn check_tool_call_quantity_failure(&self, actual_count: usize) -> bool {
        self.rubric.fail_on_tool_call_quantity && self.expected_tool_calls.len() != actual_count
    }

    /// True when the rubric demands correct selection and the sorted
    /// expected and actual names disagree
    pub fn check_tool_selection_failure(&self, actual_tools: &[&str]) -> bool {
        if !self.rubric.fail_on_tool_selection {
            return false;
        }
        let mut expected: Vec<String> = self
            .expected_tool_calls
            .iter()
            .map(|tc| comparison_key(&tc.name))
            .collect();
        let mut actual: Vec<String> = actual_tools.iter().map(|n| comparison_key(n)).collect();
        expected.sort();
        actual.sort();

        !expected
            .iter()
            .zip(&actual)
            .all(|(e, a)| compare_tool_name(e, a))
    }

    /// Score `actual_tool_calls` against this case
    pub fn evaluate(&self, actual_tool_calls: &[ToolCall]) -> EvaluationResult {
        let actual_tools: Vec<&str> = actual_tool_calls.iter().map(|tc| tc.name.as_str()).collect();

        if self.check_tool_call_quantity_failure(actual_tool_calls.len()) {
            debug!(case = %self.name, "tool call quantity mismatch");
            let expected_names: Vec<&str> = self
                .expected_tool_calls
                .iter()
                .map(|tc| tc.name.as_str())
                .collect();
            return EvaluationResult::failed(format!(
                "Expected {} tool call(s), but got {}. \nExpected tool calls: {}.\nActual tool calls: {}",
                self.expected_tool_calls.len(),
                actual_tool_calls.len(),
                expected_names.join(", "),
                actual_tools.join(", "),
            ));
        }

        if self.expected_tool_calls.is_empty() && actual_tool_calls.is_empty() {
            return EvaluationResult::trivial_pass();
        }

        if self.check_tool_selection_failure(&actual_tools) {
            debug!(case = %self.name, "tool selection mismatch");
            let expected_names: Vec<&str> = self
                .expected_tool_calls
                .iter()
                .map(|tc| tc.name.as_str())
                .collect();
            return EvaluationResult::failed(format!(
                "Tool selection mismatch. Expected tools: {expected_names:?}, but got: {actual_tools:?}"
            ));
        }

        if self.critics.is_empty() {
            return EvaluationResult::trivial_pass();
        }

        let mut result = self.score_optimal_pairs(actual_tool_calls);
        let (passed, warning) = self.rubric.classify(result.score);
        result.passed = passed;
        result.warning = warning;
        debug!(case = %self.name, score = result.score, passed, "case evaluated");
        result
    }

    /// Pair calls optimally and accumulate tool-selection and critic scores
    /// over the real (non-padded) pairs.
    fn score_optimal_pairs(&self, actual_tool_calls: &[ToolCall]) -> EvaluationResult {
        let matrix = self.create_cost_matrix(actual_tool_calls);
        let assignment = solve_max_assignment(&matrix);

        let mut result = EvaluationResult::default();
        let mut total_weight = 0.0;
        let pairs = real_pairs(
            &assignment,
            self.expected_tool_calls.len(),
            actual_tool_calls.len(),
        );
        for (i, j) in pairs {
            let expected = &self.expected_tool_calls[i];
            let actual = &actual_tool_calls[j];

            let selection_weight = self.rubric.tool_selection_weight;
            result.score_tool_selection(&expected.name, &actual.name, selection_weight);
            total_weight += selection_weight;

            for critic in &self.critics {
                let field = critic.critic_field();
                let expected_value = expected.args.get(field).cloned().unwrap_or(Value::Null);
                let actual_value = actual.args.get(field).cloned().unwrap_or(Value::Null);

                // A failed critic is recorded as a miss but left out of the total weight
                let outcome = match critic.evaluate(&expected_value, &actual_value) {
                    Ok(outcome) => {
                        total_weight += critic.resolved_weight();
                        outcome
                    }
                    Err(e) => {
                        warn!(case = %self.name, field, error = %e, "critic evaluation failed");
                        CriticScore::miss()
                    }
                };
                result.add(
                    field,
                    outcome,
                    critic.resolved_weight(),
                    expected_value,
                    actual_value,
                );
            }
        }

        result.compute_final_score(total_weight);
        result
    }

    /// Pairwise scores of expected (rows) against actual (columns) calls,
    /// padded to a square.
    ///
    /// A critic contributes only when both values are present; critic
    /// errors contribute nothing.
    pub fn create_cost_matrix(&self, actual_tool_calls: &[ToolCall]) -> Vec<Vec<f64>> {
        padded_score_matrix(
            self.expected_tool_calls.len(),
            actual_tool_calls.len(),
            |i, j| {
                let expected = &self.expected_tool_calls[i];
                let actual = &actual_tool_calls[j];
                let mut score = 0.0;

                if compare_tool_name(&expected.name, &actual.name) {
                    score += self.rubric.tool_selection_weight;
                }

                for critic in &self.critics {
                    let field = critic.critic_field();
                    let (Some(expected_value), Some(actual_value)) =
                        (expected.args.get(field), actual.args.get(field))
                    else {
                        continue;
                    };
                    if expected_value.is_null() || actual_value.is_null() {
                        continue;
                    }
                    match critic.evaluate(expected_value, actual_value) {
                        Ok(outcome) => score += outcome.score,
                        Err(e) => {
                            warn!(case = %self.name, field, error = %e, "critic evaluation failed");
                        }
                    }
                }
                score
            },
        )
    }
}

/// Reject critic lists naming the same field twice
pub fn validate_unique_critic_fields(critics: &[Critic], case: &str) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for critic in critics {
        let field = critic.critic_field();
        if !seen.insert(field) && !duplicates.contains(&field) {
            duplicates.push(field);
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(EvalError::DuplicateCritics {
            fields: duplicates.join(", "),
            case: case.to_string(),
        })
    }
}

/// Append zero-weight placeholder critics for every expected argument that
/// no critic covers yet
pub fn add_none_critics(expected: &[NamedExpectedToolCall], mut critics: Vec<Critic>) -> Vec<Critic> {
    let mut covered: HashSet<String> = critics
        .iter()
        .map(|c| c.critic_field().to_string())
        .collect();
    for call in expected {
        for field in call.args.keys() {
            if covered.insert(field.clone()) {
                critics.push(Critic::none(field.clone()));
            }
        }
    }
    critics
}
