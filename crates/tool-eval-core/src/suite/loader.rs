//! YAML suite files
//!
//! ```yaml
//! name: email
//! system_message: You are an email assistant.
//! tools:
//!   - name: Google_SendEmail
//!     inputSchema: {type: object, properties: {recipient: {type: string}}}
//! cases:
//!   - name: send
//!     user_message: Email Bob
//!     expected_tool_calls:
//!       - name: Google_SendEmail
//!         args: {recipient: bob@example.com}
//!     critics:
//!       - {type: binary, field: recipient, weight: 1.0}
//! ```

use super::{CaseOptions, EvalSuite};
use crate::case::ExpectedToolCall;
use crate::config::EvalConfig;
use crate::critic::{Critic, DatetimeCritic, NumericCritic, SimilarityCritic, Weight};
use crate::error::Result;
use crate::registry::{Args, ToolCatalog, ToolDefinition};
use crate::rubric::EvalRubric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

fn default_weight() -> Weight {
    Weight::Value(1.0)
}

/// Critic as written in a suite file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CriticSpec {
    Binary {
        field: String,
        #[serde(default = "default_weight")]
        weight: Weight,
    },
    Numeric {
        field: String,
        #[serde(default = "default_weight")]
        weight: Weight,
        value_range: (f64, f64),
        #[serde(default)]
        match_threshold: Option<f64>,
        #[serde(default)]
        tolerance: Option<f64>,
    },
    Datetime {
        field: String,
        #[serde(default = "default_weight")]
        weight: Weight,
        #[serde(default)]
        tolerance_seconds: Option<u64>,
        #[serde(default)]
        max_difference_seconds: Option<u64>,
    },
    Similarity {
        field: String,
        #[serde(default = "default_weight")]
        weight: Weight,
        #[serde(default)]
        similarity_threshold: Option<f64>,
        #[serde(default)]
        stemming: bool,
    },
    None {
        field: String,
    },
}

impl CriticSpec {
    pub fn into_critic(self) -> Critic {
        match self {
            CriticSpec::Binary { field, weight } => Critic::binary(field, weight),
            CriticSpec::Numeric {
                field,
                weight,
                value_range,
                match_threshold,
                tolerance,
            } => {
                let mut critic = NumericCritic::new(value_range.0, value_range.1);
                if let Some(threshold) = match_threshold {
                    critic = critic.with_match_threshold(threshold);
                }
                if let Some(tolerance) = tolerance {
                    critic = critic.with_tolerance(tolerance);
                }
                Critic::numeric(field, weight, critic)
            }
            CriticSpec::Datetime {
                field,
                weight,
                tolerance_seconds,
                max_difference_seconds,
            } => {
                let defaults = DatetimeCritic::default();
                let critic = DatetimeCritic::new(
                    tolerance_seconds.map_or(defaults.tolerance, Duration::from_secs),
                    max_difference_seconds.map_or(defaults.max_difference, Duration::from_secs),
                );
                Critic::datetime(field, weight, critic)
            }
            CriticSpec::Similarity {
                field,
                weight,
                similarity_threshold,
                stemming,
            } => {
                let mut critic = SimilarityCritic::default().with_stemming(stemming);
                if let Some(threshold) = similarity_threshold {
                    critic = critic.with_threshold(threshold);
                }
                Critic::similarity(field, weight, critic)
            }
            CriticSpec::None { field } => Critic::none(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedCallSpec {
    pub name: String,
    #[serde(default)]
    pub args: Args,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSpec {
    pub name: String,
    pub user_message: String,
    #[serde(default)]
    pub system_message: Option<String>,
    #[serde(default)]
    pub rubric: Option<EvalRubric>,
    #[serde(default)]
    pub additional_messages: Vec<Value>,
    #[serde(default)]
    pub expected_tool_calls: Vec<ExpectedCallSpec>,
    #[serde(default)]
    pub critics: Vec<CriticSpec>,
    /// Continue from the previous case instead of starting fresh
    #[serde(default)]
    pub extend: bool,
}

/// A whole suite file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteFile {
    pub name: String,
    #[serde(default)]
    pub system_message: String,
    #[serde(default)]
    pub rubric: Option<EvalRubric>,
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    #[serde(default)]
    pub strict_mode: Option<bool>,
    /// MCP-style descriptors
    #[serde(default)]
    pub tools: Vec<Value>,
    /// Native tool definitions
    #[serde(default)]
    pub catalog: Vec<ToolDefinition>,
    #[serde(default)]
    pub cases: Vec<CaseSpec>,
}

impl SuiteFile {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Build the suite; unset suite-level settings fall back to `config`
    pub fn into_suite(self, config: &EvalConfig) -> Result<EvalSuite> {
        let rubric = self.rubric.unwrap_or(config.rubric);
        rubric.validate()?;

        let mut suite = EvalSuite::new(self.name, self.system_message)
            .with_rubric(rubric)
            .with_max_concurrent(self.max_concurrent.unwrap_or(config.max_concurrent))
            .with_strict_mode(self.strict_mode.unwrap_or(config.strict_mode));

        let mut catalog = ToolCatalog::new();
        for definition in self.catalog {
            catalog.add_tool(definition)?;
        }
        suite.add_tool_definitions(self.tools)?;
        suite.add_tool_catalog(&catalog)?;

        for case in self.cases {
            add_case_spec(&mut suite, &catalog, case)?;
        }
        Ok(suite)
    }
}

fn add_case_spec(suite: &mut EvalSuite, catalog: &ToolCatalog, case: CaseSpec) -> Result<()> {
    if let Some(rubric) = &case.rubric {
        rubric.validate()?;
    }
    let expected = case
        .expected_tool_calls
        .into_iter()
        .map(|call| match catalog.get_tool(&call.name) {
            Some(tool) => ExpectedToolCall::native(tool.clone(), call.args),
            None => ExpectedToolCall::named(call.name, call.args),
        })
        .collect();
    let critics = case.critics.into_iter().map(CriticSpec::into_critic).collect();
    let options = CaseOptions {
        system_message: case.system_message,
        rubric: case.rubric,
        additional_messages: case.additional_messages,
    };

    if case.extend {
        suite.extend_case(case.name, case.user_message, expected, critics, options)?;
    } else {
        suite.add_case(case.name, case.user_message, expected, critics, options)?;
    }
    Ok(())
}

/// Load a suite file, using `config` for unset suite-level settings
pub fn load_suite(path: &Path, config: &EvalConfig) -> Result<EvalSuite> {
    tracing::debug!(path = %path.display(), "loading suite");
    SuiteFile::load(path)?.into_suite(config)
}
