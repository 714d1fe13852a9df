//! Tool abstraction for model function-calling.
//!
//! A [`Tool`] has a typed input (its JSON schema is derived with `schemars`),
//! a typed serializable output and a natural-language description. Tools are
//! registered in a fixed [`ToolRegistry`] handed to the orchestrator, which
//! dispatches calls through the type-erased [`DynTool`] interface.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AgentError;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the registry entry).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content (JSON string on success, error message on failure).
    pub content: String,
    /// Whether this result represents a dispatch error.
    pub is_error: bool,
}

/// A capability exposed to the model.
///
/// Implementations never fail: domain failures belong in `Output` so the
/// model sees them as data. Only malformed arguments are rejected, by the
/// dispatcher, before [`Tool::call`] runs.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Arguments accepted by the tool.
    type Input: DeserializeOwned + JsonSchema + Send;
    /// Value returned to the model.
    type Output: Serialize + Send;

    /// Name the model uses to call the tool.
    const NAME: &'static str;

    /// Natural-language description of the tool and its arguments.
    fn description(&self) -> String;

    /// Runs the tool.
    async fn call(&self, input: Self::Input) -> Self::Output;
}

/// Object-safe view of a [`Tool`], working on JSON text.
#[async_trait]
pub trait DynTool: Send + Sync {
    /// Tool name.
    fn name(&self) -> &'static str;

    /// Definition sent to the model.
    fn definition(&self) -> ToolDefinition;

    /// Decodes `arguments`, runs the tool and encodes its output.
    async fn call_json(&self, arguments: &str) -> Result<String, AgentError>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: T::NAME.to_string(),
            description: self.description(),
            parameters: input_schema::<T::Input>(),
        }
    }

    async fn call_json(&self, arguments: &str) -> Result<String, AgentError> {
        // Argument-less calls sometimes arrive with an empty string
        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        let input: T::Input =
            serde_json::from_str(arguments).map_err(|e| AgentError::ToolExecution {
                name: T::NAME.to_string(),
                message: format!("invalid arguments: {e}"),
            })?;
        let output = self.call(input).await;
        serde_json::to_string(&output).map_err(|e| AgentError::ToolExecution {
            name: T::NAME.to_string(),
            message: format!("output serialization failed: {e}"),
        })
    }
}

/// JSON schema of a tool input, stripped of the metadata keys function-calling
/// APIs do not need.
fn input_schema<I: JsonSchema>() -> serde_json::Value {
    let mut value = serde_json::to_value(schemars::schema_for!(I))
        .unwrap_or_else(|_| json!({ "type": "object", "properties": {} }));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    value
}

/// The fixed set of tools available to an agent.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn DynTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Empty registry (no tools available).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a tool. A later tool with the same name replaces the earlier one.
    #[must_use]
    pub fn with(mut self, tool: impl DynTool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Adds a shared tool.
    pub fn register(&mut self, tool: Arc<dyn DynTool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Definitions of all registered tools, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Names of all registered tools.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
