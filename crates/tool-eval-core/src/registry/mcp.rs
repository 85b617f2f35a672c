use super::{openai_tool, Args, ToolFormat, ToolRegistry};
use crate::error::{EvalError, Result};
use crate::registry::strict::convert_to_strict_mode_schema;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Registry of MCP-style tool descriptors.
///
/// A descriptor is a JSON object with `name`, optional `description` and
/// optional `inputSchema`. Tools keep their registration order.
#[derive(Debug, Clone, Default)]
pub struct McpToolRegistry {
    tools: Map<String, Value>,
    strict_mode: bool,
    unique_names: bool,
}

impl McpToolRegistry {
    pub fn new(strict_mode: bool) -> Self {
        Self {
            tools: Map::new(),
            strict_mode,
            unique_names: false,
        }
    }

    /// Registry that rejects a name registered twice.
    ///
    /// Suites use this as their unified registry, where every tool name must
    /// be unique across all sources.
    pub fn unique(strict_mode: bool) -> Self {
        Self {
            unique_names: true,
            ..Self::new(strict_mode)
        }
    }

    pub fn with_tools(tools: Vec<Value>, strict_mode: bool) -> Result<Self> {
        let mut registry = Self::new(strict_mode);
        registry.add_tools(tools)?;
        Ok(registry)
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn set_strict_mode(&mut self, strict_mode: bool) {
        self.strict_mode = strict_mode;
    }

    /// Register one descriptor; a later descriptor with the same name
    /// replaces the earlier one unless the registry is unique.
    pub fn add_tool(&mut self, descriptor: Value) -> Result<()> {
        let name = descriptor
            .get("name")
            .and_then(Value::as_str)
            .ok_or(EvalError::MissingName)?
            .to_string();

        if self.unique_names && self.tools.contains_key(&name) {
            return Err(EvalError::already_exists(
                "tool (names must be unique across all tool sources)",
                &name,
            ));
        }

        debug!(tool = %name, "add_tool");
        self.tools.insert(name, descriptor);
        Ok(())
    }

    pub fn add_tools(&mut self, tools: impl IntoIterator<Item = Value>) -> Result<()> {
        for tool in tools {
            self.add_tool(tool)?;
        }
        Ok(())
    }

    /// Declared properties of a tool's input schema
    fn properties(&self, tool_name: &str) -> Option<&Map<String, Value>> {
        self.tools
            .get(tool_name)?
            .get("inputSchema")?
            .get("properties")?
            .as_object()
    }
}

impl ToolRegistry for McpToolRegistry {
    fn list_tools_for_model(&self, tool_format: &str) -> Result<Vec<Value>> {
        let ToolFormat::OpenAi = tool_format.parse::<ToolFormat>()?;

        self.tools
            .iter()
            .map(|(name, tool)| {
                let mut parameters = tool
                    .get("inputSchema")
                    .cloned()
                    .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
                if self.strict_mode && parameters.is_object() {
                    parameters = convert_to_strict_mode_schema(&parameters)?;
                }
                let description = tool
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Ok(openai_tool(name, description, parameters, self.strict_mode))
            })
            .collect()
    }

    fn resolve_tool_name(&self, identifier: &str) -> Result<String> {
        if self.tools.contains_key(identifier) {
            Ok(identifier.to_string())
        } else {
            Err(EvalError::not_found("tool", identifier))
        }
    }

    fn normalize_args(&self, tool_name: &str, args: &Args) -> Result<Args> {
        let mut normalized = args.clone();
        if let Some(properties) = self.properties(tool_name) {
            for (name, schema) in properties {
                if normalized.contains_key(name) {
                    continue;
                }
                if let Some(default) = schema.get("default") {
                    normalized.insert(name.clone(), default.clone());
                }
            }
        }
        Ok(normalized)
    }

    fn tool_schema(&self, tool_name: &str) -> Option<Value> {
        self.tools.get(tool_name).cloned()
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    fn tool_count(&self) -> usize {
        self.tools.len()
    }

    fn has_tool(&self, tool_name: &str) -> bool {
        self.tools.contains_key(tool_name)
    }
}
