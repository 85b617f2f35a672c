use super::{Args, McpToolRegistry, ToolFormat, ToolRegistry};
use crate::error::{EvalError, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Where a lookup key points
#[derive(Debug, Clone, PartialEq, Eq)]
enum ToolTarget {
    Unique { server: String, tool: String },
    /// A short name exposed by more than one server
    Ambiguous,
}

/// Several MCP registries combined under server namespaces.
///
/// Each tool is reachable as `server_tool` (canonical, OpenAI-safe),
/// `server.tool`, or by its bare name when only one server exposes it.
#[derive(Debug, Clone)]
pub struct CompositeMcpRegistry {
    registries: Vec<(String, McpToolRegistry)>,
    tool_map: HashMap<String, ToolTarget>,
    strict_mode: bool,
}

impl CompositeMcpRegistry {
    /// Combine pre-built registries with descriptor lists.
    ///
    /// Pre-built registries keep their own strict-mode flag; registries
    /// built from `tool_lists` inherit `strict_mode`.
    pub fn new(
        registries: Vec<(String, McpToolRegistry)>,
        tool_lists: Vec<(String, Vec<Value>)>,
        strict_mode: bool,
    ) -> Result<Self> {
        let mut composite = Self {
            registries: Vec::new(),
            tool_map: HashMap::new(),
            strict_mode,
        };

        for (server, registry) in registries {
            composite.add_registry(server, registry)?;
        }
        for (server, tools) in tool_lists {
            let registry = McpToolRegistry::with_tools(tools, strict_mode)?;
            composite.add_registry(server, registry)?;
        }

        if composite.registries.is_empty() {
            return Err(EvalError::invalid_value(
                "composite registry",
                "at least one registry or tool list must be provided",
            ));
        }
        Ok(composite)
    }

    pub fn from_registries(registries: Vec<(String, McpToolRegistry)>) -> Result<Self> {
        Self::new(registries, Vec::new(), true)
    }

    pub fn from_tool_lists(tool_lists: Vec<(String, Vec<Value>)>, strict_mode: bool) -> Result<Self> {
        Self::new(Vec::new(), tool_lists, strict_mode)
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Add another server; its name must not be in use
    pub fn add_registry(&mut self, server: String, registry: McpToolRegistry) -> Result<()> {
        if self.get_registry(&server).is_some() {
            return Err(EvalError::already_exists("server", &server));
        }

        for tool in registry.tool_names() {
            let target = ToolTarget::Unique {
                server: server.clone(),
                tool: tool.clone(),
            };
            self.tool_map
                .insert(format!("{server}_{tool}"), target.clone());
            self.tool_map
                .insert(format!("{server}.{tool}"), target.clone());
            self.tool_map
                .entry(tool)
                .and_modify(|existing| *existing = ToolTarget::Ambiguous)
                .or_insert(target);
        }

        self.registries.push((server, registry));
        Ok(())
    }

    pub fn get_server_names(&self) -> Vec<String> {
        self.registries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get_registry(&self, server: &str) -> Option<&McpToolRegistry> {
        self.registries
            .iter()
            .find(|(name, _)| name == server)
            .map(|(_, registry)| registry)
    }

    /// Resolve to `(server, tool)` or fail on unknown/ambiguous names
    fn lookup(&self, identifier: &str) -> Result<(&McpToolRegistry, &str, &str)> {
        match self.tool_map.get(identifier) {
            Some(ToolTarget::Unique { server, tool }) => {
                let registry = self
                    .get_registry(server)
                    .ok_or_else(|| EvalError::not_found("server", server))?;
                Ok((registry, server, tool))
            }
            Some(ToolTarget::Ambiguous) => Err(EvalError::AmbiguousTool {
                name: identifier.to_string(),
            }),
            None => Err(EvalError::not_found("tool in any registry", identifier)),
        }
    }
}

impl ToolRegistry for CompositeMcpRegistry {
    fn list_tools_for_model(&self, tool_format: &str) -> Result<Vec<Value>> {
        let ToolFormat::OpenAi = tool_format.parse::<ToolFormat>()?;

        let mut all_tools = Vec::new();
        for (server, registry) in &self.registries {
            for mut tool in registry.list_tools_for_model(tool_format)? {
                let name = tool["function"]["name"].as_str().unwrap_or_default();
                let namespaced = format!("{server}_{name}");
                tool["function"]["name"] = Value::String(namespaced);
                all_tools.push(tool);
            }
        }
        Ok(all_tools)
    }

    /// Always answers in the `server_tool` form
    fn resolve_tool_name(&self, identifier: &str) -> Result<String> {
        let (_, server, tool) = self.lookup(identifier)?;
        Ok(format!("{server}_{tool}"))
    }

    fn normalize_args(&self, tool_name: &str, args: &Args) -> Result<Args> {
        let (registry, _, tool) = self.lookup(tool_name)?;
        registry.normalize_args(tool, args)
    }

    fn tool_schema(&self, tool_name: &str) -> Option<Value> {
        let (registry, _, tool) = self.lookup(tool_name).ok()?;
        registry.tool_schema(tool)
    }

    fn tool_names(&self) -> Vec<String> {
        self.registries
            .iter()
            .flat_map(|(server, registry)| {
                registry
                    .tool_names()
                    .into_iter()
                    .map(move |tool| format!("{server}_{tool}"))
            })
            .collect()
    }

    fn process_tool_call(&self, tool_name: &str, args: &Args) -> (String, Args) {
        match self.resolve_tool_name(tool_name) {
            Ok(resolved) => {
                let args = self
                    .normalize_args(&resolved, args)
                    .unwrap_or_else(|_| args.clone());
                (resolved, args)
            }
            Err(_) => (tool_name.to_string(), args.clone()),
        }
    }
}
