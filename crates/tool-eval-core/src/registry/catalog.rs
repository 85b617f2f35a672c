use super::{openai_tool, Args, ToolFormat, ToolRegistry};
use crate::error::{EvalError, Result};
use crate::naming::{compare_tool_name, TOOL_NAME_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One declared parameter of a native tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type", default = "default_value_type")]
    pub value_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

fn default_value_type() -> String {
    "string".to_string()
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            description: String::new(),
            default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Parameters without a default must be supplied by the model
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A natively declared tool: the typed signature of a toolkit function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub toolkit: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(toolkit: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            toolkit: toolkit.into(),
            name: name.into(),
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// `Toolkit.Name`
    pub fn fully_qualified_name(&self) -> String {
        format!("{}{}{}", self.toolkit, TOOL_NAME_SEPARATOR, self.name)
    }

    /// `Toolkit_Name`, the form OpenAI accepts
    pub fn openai_name(&self) -> String {
        format!("{}_{}", self.toolkit, self.name)
    }

    /// JSON schema of the parameters
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                let mut schema = json!({"type": p.value_type});
                if !p.description.is_empty() {
                    schema["description"] = Value::String(p.description.clone());
                }
                (p.name.clone(), schema)
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// MCP-style descriptor named with the OpenAI form
    pub fn to_descriptor(&self) -> Value {
        json!({
            "name": self.openai_name(),
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    /// Bind `args` to the signature.
    ///
    /// Every declared parameter gets an entry: the provided value, else the
    /// declared default, else null. Arguments outside the signature are
    /// dropped.
    pub fn fill_defaults(&self, args: &Args) -> Args {
        self.parameters
            .iter()
            .map(|p| {
                let value = args
                    .get(&p.name)
                    .cloned()
                    .or_else(|| p.default.clone())
                    .unwrap_or(Value::Null);
                (p.name.clone(), value)
            })
            .collect()
    }

    fn answers_to(&self, identifier: &str) -> bool {
        compare_tool_name(&self.fully_qualified_name(), identifier)
    }
}

/// Registry over natively declared tool definitions
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; its fully qualified name must be new
    pub fn add_tool(&mut self, definition: ToolDefinition) -> Result<()> {
        let fq_name = definition.fully_qualified_name();
        if self.get_tool(&fq_name).is_some() {
            return Err(EvalError::already_exists("tool", fq_name));
        }
        self.tools.push(definition);
        Ok(())
    }

    pub fn with_tool(mut self, definition: ToolDefinition) -> Result<Self> {
        self.add_tool(definition)?;
        Ok(self)
    }

    /// Find a definition under any separator convention
    pub fn get_tool(&self, identifier: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.answers_to(identifier))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistry for ToolCatalog {
    fn list_tools_for_model(&self, tool_format: &str) -> Result<Vec<Value>> {
        let ToolFormat::OpenAi = tool_format.parse::<ToolFormat>()?;
        Ok(self
            .tools
            .iter()
            .map(|t| openai_tool(&t.openai_name(), &t.description, t.input_schema(), false))
            .collect())
    }

    fn resolve_tool_name(&self, identifier: &str) -> Result<String> {
        self.get_tool(identifier)
            .map(ToolDefinition::fully_qualified_name)
            .ok_or_else(|| EvalError::not_found("tool in catalog", identifier))
    }

    fn normalize_args(&self, tool_name: &str, args: &Args) -> Result<Args> {
        let tool = self
            .get_tool(tool_name)
            .ok_or_else(|| EvalError::not_found("tool in catalog", tool_name))?;
        Ok(tool.fill_defaults(args))
    }

    fn tool_schema(&self, tool_name: &str) -> Option<Value> {
        self.get_tool(tool_name)
            .and_then(|t| serde_json::to_value(t).ok())
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(ToolDefinition::fully_qualified_name)
            .collect()
    }

    fn descriptors(&self) -> Vec<Value> {
        self.tools.iter().map(ToolDefinition::to_descriptor).collect()
    }
}
