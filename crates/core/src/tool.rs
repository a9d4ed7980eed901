//! Tool trait — the abstraction over the assistant's external actions.
//!
//! Tools are what let the agent act on the user's behalf: search the CRM,
//! draft an email, create a calendar event, query a mailbox. Each wraps a
//! single async operation against an external collaborator.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use crate::schema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content, fed back to the model as a tool message
    pub output: String,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }
}

/// Named recovery policies a tool can attach for malformed or unsafe input.
///
/// The executor consults these instead of hard-coding per-tool conditionals,
/// so each policy can be tested independently of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// When the model sends empty arguments, execute with this default
    /// instead of failing the turn. Only for tools with a safe, well-known
    /// default such as "list the most recent records".
    DefaultArguments(serde_json::Value),

    /// When the named field holds a filter query with an embedded quote
    /// character (which breaks the transport serialization), drop the filter
    /// and bound the result count instead of failing. The rest of the
    /// arguments — in particular the record type — are preserved.
    StripQuotedFilter {
        field: &'static str,
        limit_field: &'static str,
        limit: u64,
    },
}

/// The core Tool trait.
///
/// Tools are registered in the [`ToolRegistry`] and made available to the
/// agent loop; lookup is by name, not by type.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "crm_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Fields that must be force-marked `required` in the emitted schema,
    /// even when the schema converter did not infer them. Models omit these
    /// otherwise.
    fn required_overrides(&self) -> &[&str] {
        &[]
    }

    /// Recovery policies applied by the executor before invocation.
    fn recovery_policies(&self) -> Vec<RecoveryPolicy> {
        Vec::new()
    }

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a sanitized ToolDefinition for the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: schema::sanitize(self.parameters_schema(), self.required_overrides()),
        }
    }
}

/// A registry of available tools.
///
/// Built once per session from the enabled integrations; immutable after
/// construction. The agent loop uses it to:
/// 1. Get tool definitions to send to the LLM
/// 2. Look up and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                }
            })
        }
        fn required_overrides(&self) -> &[&str] {
            &["text"]
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("").to_string();
            Ok(ToolResult::ok(text))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn definition_is_sanitized() {
        let def = EchoTool.to_definition();
        assert!(def.parameters.get("$schema").is_none());
        assert_eq!(def.parameters["required"], serde_json::json!(["text"]));
    }

    #[test]
    fn registry_names_are_sorted() {
        struct Named(&'static str);

        #[async_trait]
        impl Tool for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn description(&self) -> &str {
                "test"
            }
            fn parameters_schema(&self) -> serde_json::Value {
                serde_json::json!({"type": "object"})
            }
            async fn execute(
                &self,
                _arguments: serde_json::Value,
            ) -> std::result::Result<ToolResult, ToolError> {
                Ok(ToolResult::ok(""))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(Named("zeta")));
        registry.register(Box::new(Named("alpha")));
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn registry_execute_via_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let tool = registry.get("echo").unwrap();
        let result = tool
            .execute(serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hello world");
    }

    #[test]
    fn default_recovery_policies_are_empty() {
        assert!(EchoTool.recovery_policies().is_empty());
    }
}
