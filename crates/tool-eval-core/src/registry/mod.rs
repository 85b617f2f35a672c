//! Tool registries: name resolution, default filling and model payloads
//!
//! Three sources implement [`ToolRegistry`]:
//! - [`McpToolRegistry`]: MCP-style JSON descriptors
//! - [`CompositeMcpRegistry`]: several MCP registries namespaced by server
//! - [`ToolCatalog`]: natively declared tool definitions

pub mod catalog;
pub mod composite;
pub mod mcp;
pub mod strict;

pub use catalog::{ToolCatalog, ToolDefinition, ToolParameter};
pub use composite::CompositeMcpRegistry;
pub use mcp::McpToolRegistry;
pub use strict::{convert_to_strict_mode_schema, MAX_SCHEMA_DEPTH};

use crate::error::{EvalError, Result};
use crate::naming::compare_tool_name;
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// Argument mapping of a tool call
pub type Args = Map<String, Value>;

/// Wire format for tool lists sent to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFormat {
    OpenAi,
}

impl FromStr for ToolFormat {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(ToolFormat::OpenAi),
            other => Err(EvalError::unsupported("tool format", other, "openai")),
        }
    }
}

/// Build one OpenAI function-calling entry
pub(crate) fn openai_tool(name: &str, description: &str, parameters: Value, strict: bool) -> Value {
    let mut function = json!({
        "name": name,
        "description": description,
        "parameters": parameters,
    });
    if strict {
        function["strict"] = Value::Bool(true);
    }
    json!({"type": "function", "function": function})
}

/// Capability set shared by every tool source used in evaluations
pub trait ToolRegistry: Send + Sync {
    /// Tool list payload for a model request (`"openai"` only)
    fn list_tools_for_model(&self, tool_format: &str) -> Result<Vec<Value>>;

    /// Resolve an identifier to the registry's canonical tool name
    fn resolve_tool_name(&self, identifier: &str) -> Result<String>;

    /// Fill arguments absent from `args` that have a declared default
    fn normalize_args(&self, tool_name: &str, args: &Args) -> Result<Args>;

    /// Raw descriptor or definition for a tool
    fn tool_schema(&self, tool_name: &str) -> Option<Value>;

    /// Canonical names of all tools, in registration order
    fn tool_names(&self) -> Vec<String>;

    fn tool_count(&self) -> usize {
        self.tool_names().len()
    }

    fn has_tool(&self, tool_name: &str) -> bool {
        self.tool_names().iter().any(|name| name == tool_name)
    }

    /// MCP-style descriptors named by canonical tool name
    fn descriptors(&self) -> Vec<Value> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| {
                let mut descriptor = self.tool_schema(&name)?;
                descriptor.as_object_mut()?.insert("name".into(), Value::String(name));
                Some(descriptor)
            })
            .collect()
    }

    /// Resolve a model-produced call and fill its defaults.
    ///
    /// Exact names win; otherwise the first tool whose name matches across
    /// separator conventions is used. Unknown names pass through unchanged.
    fn process_tool_call(&self, tool_name: &str, args: &Args) -> (String, Args) {
        let resolved = if self.has_tool(tool_name) {
            tool_name.to_string()
        } else {
            self.tool_names()
                .into_iter()
                .find(|candidate| compare_tool_name(candidate, tool_name))
                .unwrap_or_else(|| tool_name.to_string())
        };
        let args = self
            .normalize_args(&resolved, args)
            .unwrap_or_else(|_| args.clone());
        (resolved, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_openai_format_is_supported() {
        assert_eq!("openai".parse::<ToolFormat>().unwrap(), ToolFormat::OpenAi);
        let err = "anthropic".parse::<ToolFormat>().unwrap_err();
        assert!(err.to_string().contains("anthropic"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_process_tool_call_resolves_across_separators() {
        let registry = McpToolRegistry::with_tools(
            vec![json!({
                "name": "Google_ListEmails",
                "inputSchema": {
                    "type": "object",
                    "properties": {"n_emails": {"type": "integer", "default": 5}},
                },
            })],
            true,
        )
        .unwrap();

        let (name, args) = registry.process_tool_call("Google.ListEmails", &Args::new());
        assert_eq!(name, "Google_ListEmails");
        assert_eq!(args["n_emails"], 5);
    }

    #[test]
    fn test_process_tool_call_passes_unknown_through() {
        let registry = McpToolRegistry::new(true);
        let mut args = Args::new();
        args.insert("q".into(), json!("x"));
        let (name, processed) = registry.process_tool_call("Unknown.Tool", &args);
        assert_eq!(name, "Unknown.Tool");
        assert_eq!(processed, args);
    }
}
