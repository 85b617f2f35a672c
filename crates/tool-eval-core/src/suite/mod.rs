//! Evaluation suites
//!
//! A suite owns its cases and a unified tool registry. Tools from every
//! source (raw descriptors, native catalogs, other registries) land in that
//! registry under unique names; running the suite sends the registry's tool
//! list to the model and scores what comes back.

pub mod loader;
pub mod report;
mod run;

pub use report::{CaptureResult, CapturedCase, CaseReport, SuiteReport};

use crate::case::{add_none_critics, EvalCase, ExpectedToolCall, ToolCall};
use crate::critic::Critic;
use crate::error::{EvalError, Result};
use crate::registry::{McpToolRegistry, ToolCatalog, ToolRegistry};
use crate::rubric::EvalRubric;
use serde_json::{json, Value};
use tracing::debug;

/// Optional per-case settings for [`EvalSuite::add_case`] and
/// [`EvalSuite::extend_case`]
#[derive(Debug, Clone, Default)]
pub struct CaseOptions {
    pub system_message: Option<String>,
    pub rubric: Option<EvalRubric>,
    pub additional_messages: Vec<Value>,
}

/// A named collection of cases sharing a tool registry
#[derive(Debug, Clone)]
pub struct EvalSuite {
    pub name: String,
    pub system_message: String,
    pub rubric: EvalRubric,
    pub max_concurrent: usize,
    cases: Vec<EvalCase>,
    registry: McpToolRegistry,
    catalog: ToolCatalog,
}

impl EvalSuite {
    pub fn new(name: impl Into<String>, system_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_message: system_message.into(),
            rubric: EvalRubric::default(),
            max_concurrent: 1,
            cases: Vec::new(),
            registry: McpToolRegistry::unique(true),
            catalog: ToolCatalog::new(),
        }
    }

    pub fn with_rubric(mut self, rubric: EvalRubric) -> Self {
        self.rubric = rubric;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Send strict-mode schemas to the model (default true)
    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.registry.set_strict_mode(strict_mode);
        self
    }

    pub fn strict_mode(&self) -> bool {
        self.registry.strict_mode()
    }

    pub fn cases(&self) -> &[EvalCase] {
        &self.cases
    }

    /// The unified registry every case is evaluated against
    pub fn registry(&self) -> &McpToolRegistry {
        &self.registry
    }

    /// Register MCP-style descriptors.
    ///
    /// Missing `description` becomes `""` and a missing `inputSchema` an
    /// empty object schema. Names must be unique across all tool sources.
    pub fn add_tool_definitions(&mut self, tools: Vec<Value>) -> Result<&mut Self> {
        for mut tool in tools {
            let descriptor = tool.as_object_mut().ok_or(EvalError::MissingName)?;
            if !descriptor.get("name").is_some_and(Value::is_string) {
                return Err(EvalError::MissingName);
            }
            descriptor
                .entry("description")
                .or_insert_with(|| Value::String(String::new()));
            descriptor
                .entry("inputSchema")
                .or_insert_with(|| json!({"type": "object", "properties": {}}));
            self.registry.add_tool(tool)?;
        }
        Ok(self)
    }

    /// Register native tool definitions under their `Toolkit_Name` form and
    /// keep their signatures for default filling
    pub fn add_tool_catalog(&mut self, catalog: &ToolCatalog) -> Result<&mut Self> {
        for tool in catalog.iter() {
            self.registry.add_tool(tool.to_descriptor())?;
            self.catalog.add_tool(tool.clone())?;
        }
        Ok(self)
    }

    /// Copy every tool of another registry in under its canonical name
    pub fn add_registry(&mut self, registry: &dyn ToolRegistry) -> Result<&mut Self> {
        let descriptors = registry.descriptors();
        debug!(suite = %self.name, tools = descriptors.len(), "add_registry");
        self.registry.add_tools(descriptors)?;
        Ok(self)
    }

    pub fn with_registry(mut self, registry: &dyn ToolRegistry) -> Result<Self> {
        self.add_registry(registry)?;
        Ok(self)
    }

    pub fn tool_count(&self) -> usize {
        self.registry.tool_count()
    }

    pub fn list_tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }

    /// Resolve an expected call to its registered name and fill defaults
    fn convert_expected(&self, expected: ExpectedToolCall) -> Result<ToolCall> {
        match expected {
            ExpectedToolCall::Named { tool_name, args } => {
                let args = if self.registry.has_tool(&tool_name) {
                    self.registry.normalize_args(&tool_name, &args)?
                } else {
                    args
                };
                Ok(ToolCall::new(tool_name, args))
            }
            ExpectedToolCall::Native { tool, args } => {
                let registered = self
                    .catalog
                    .get_tool(&tool.fully_qualified_name())
                    .ok_or_else(|| {
                        EvalError::not_found(
                            "native tool (register it with add_tool_catalog first)",
                            tool.fully_qualified_name(),
                        )
                    })?;
                Ok(ToolCall::new(
                    registered.openai_name(),
                    registered.fill_defaults(&args),
                ))
            }
        }
    }

    fn convert_all(&self, expected: Vec<ExpectedToolCall>) -> Result<Vec<ToolCall>> {
        expected
            .into_iter()
            .map(|tc| self.convert_expected(tc))
            .collect()
    }

    /// Add a case; uncovered expected arguments get placeholder critics
    pub fn add_case(
        &mut self,
        name: impl Into<String>,
        user_message: impl Into<String>,
        expected_tool_calls: Vec<ExpectedToolCall>,
        critics: Vec<Critic>,
        options: CaseOptions,
    ) -> Result<&mut Self> {
        let expected = self.convert_all(expected_tool_calls)?;
        let critics = add_none_critics(&expected, critics);

        let case = EvalCase::new(name, user_message, expected, critics)?
            .with_system_message(
                options
                    .system_message
                    .unwrap_or_else(|| self.system_message.clone()),
            )
            .with_rubric(options.rubric.unwrap_or(self.rubric))
            .with_additional_messages(options.additional_messages);
        self.cases.push(case);
        Ok(self)
    }

    /// Add a follow-up to the last case.
    ///
    /// Empty `expected_tool_calls` or `critics` carry the previous case's
    /// over. New additional messages are appended to the previous ones.
    pub fn extend_case(
        &mut self,
        name: impl Into<String>,
        user_message: impl Into<String>,
        expected_tool_calls: Vec<ExpectedToolCall>,
        critics: Vec<Critic>,
        options: CaseOptions,
    ) -> Result<&mut Self> {
        let Some(last) = self.cases.last() else {
            return Err(EvalError::invalid_value(
                "extend_case",
                "No cases to extend. Add a case first.",
            ));
        };

        let mut additional_messages = last.additional_messages.clone();
        additional_messages.extend(options.additional_messages);

        let system_message = options
            .system_message
            .unwrap_or_else(|| last.system_message.clone());
        let inherited_expected = last.expected_tool_calls.clone();
        let inherited_critics = last.critics.clone();

        let expected = if expected_tool_calls.is_empty() {
            inherited_expected
        } else {
            self.convert_all(expected_tool_calls)?
        };
        let critics = if critics.is_empty() {
            inherited_critics
        } else {
            critics
        };
        let critics = add_none_critics(&expected, critics);

        let case = EvalCase::new(name, user_message, expected, critics)?
            .with_system_message(system_message)
            .with_rubric(options.rubric.unwrap_or(self.rubric))
            .with_additional_messages(additional_messages);
        self.cases.push(case);
        Ok(self)
    }

    /// Resolve model-produced calls against the unified registry, then
    /// bind native tools to their signatures
    pub fn process_tool_calls(&self, tool_calls: Vec<ToolCall>) -> Vec<ToolCall> {
        tool_calls
            .into_iter()
            .map(|call| {
                let (name, args) = self.registry.process_tool_call(&call.name, &call.args);
                let args = match self.catalog.iter().find(|t| t.openai_name() == name) {
                    Some(tool) => tool.fill_defaults(&args),
                    None => args,
                };
                ToolCall::new(name, args)
            })
            .collect()
    }
}
