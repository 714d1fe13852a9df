//! Tool executor that dispatches model tool calls to registered tools.
//!
//! Every call produces a [`ToolResult`]; dispatch failures (unknown tool,
//! oversized or malformed arguments) become error results the model can read
//! instead of aborting the turn.

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::tool::{ToolCall, ToolRegistry, ToolResult};
use crate::error::AgentError;

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Executes tool calls against a [`ToolRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct ToolExecutor<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> ToolExecutor<'a> {
    /// Creates a new executor over the given registry.
    #[must_use]
    pub const fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Dispatches a tool call to the matching tool.
    ///
    /// Validates raw argument size before dispatch to prevent oversized payloads.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return ToolResult {
                tool_call_id: call.id.clone(),
                content: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
                is_error: true,
            };
        }

        let result = match self.registry.get(&call.name) {
            Some(tool) => tool.call_json(&call.arguments).await,
            None => Err(AgentError::ToolExecution {
                name: call.name.clone(),
                message: "unknown tool".to_string(),
            }),
        };

        match result {
            Ok(content) => {
                debug!(tool = call.name, call_id = call.id, "tool execution complete");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content,
                    is_error: false,
                }
            }
            Err(e) => {
                warn!(tool = call.name, call_id = call.id, error = %e, "tool call rejected");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content: e.to_string(),
                    is_error: true,
                }
            }
        }
    }

    /// Executes all calls of one model response concurrently.
    ///
    /// Waits for every call; results come back in call order.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.execute(call))).await
    }
}
