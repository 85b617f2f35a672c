//! Serializable suite run and capture results

use crate::case::{EvalCase, EvaluationResult, ToolCall};
use crate::multirun::{CriticStats, RunStats};
use crate::rubric::EvalRubric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of one case within a suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub name: String,
    pub input: String,
    pub system_message: String,
    pub additional_messages: Vec<Value>,
    pub expected_tool_calls: Vec<ToolCall>,
    pub predicted_tool_calls: Vec<ToolCall>,
    pub evaluation: EvaluationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_stats: Option<RunStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_stats: Option<BTreeMap<String, CriticStats>>,
    /// Set when the case could not be evaluated (model failure, task panic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseReport {
    pub(crate) fn for_case(
        case: &EvalCase,
        predicted_tool_calls: Vec<ToolCall>,
        evaluation: EvaluationResult,
    ) -> Self {
        Self {
            name: case.name.clone(),
            input: case.user_message.clone(),
            system_message: case.system_message.clone(),
            additional_messages: case.additional_messages.clone(),
            expected_tool_calls: case.expected_tool_calls.clone(),
            predicted_tool_calls,
            evaluation,
            run_stats: None,
            critic_stats: None,
            error: None,
        }
    }

    /// Report for a case whose evaluation could not complete
    pub(crate) fn errored(case: &EvalCase, error: String) -> Self {
        let mut report = Self::for_case(case, Vec::new(), EvaluationResult::failed(error.clone()));
        report.error = Some(error);
        report
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.evaluation.passed
    }
}

/// Result of running a whole suite against one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite_name: String,
    pub model: String,
    pub provider: String,
    pub rubric: EvalRubric,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn warned_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.error.is_none() && c.evaluation.warning)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.len() - self.passed_count() - self.warned_count()
    }

    pub fn errored_count(&self) -> usize {
        self.cases.iter().filter(|c| c.error.is_some()).count()
    }

    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }
}

/// Tool calls recorded for one case in capture mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCase {
    pub case_name: String,
    pub user_message: String,
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_messages: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub suite_name: String,
    pub model: String,
    pub provider: String,
    pub captured_cases: Vec<CapturedCase>,
}
