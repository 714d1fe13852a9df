//! Streaming orchestrator for one conversation turn.
//!
//! Drives the model, executes the tools it calls, and validates its output
//! as it streams:
//!
//! ```text
//! user message → model round ─┬─ tool calls → execute all → next round
//!                             ├─ each text chunk → lenient validation → Partial
//!                             └─ stream end      → strict validation  → Final
//!                                                       └─ invalid → retry prompt → next round
//! ```
//!
//! Every event carries a snapshot of the committed history, so each
//! snapshot is a prefix of the next one. The turn ends with
//! [`TurnEvent::Finished`], whose history is authoritative.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use super::config::{AgentConfig, FinalOutputPolicy};
use super::executor::ToolExecutor;
use super::message::{
    ConversationHistory, assistant_message, assistant_tool_calls_message, tool_message,
    user_message,
};
use super::prompt::{build_retry_prompt, load_system_prompt};
use super::provider::{LlmProvider, ToolCallAccumulator};
use super::response::{StructuredResponse, validate_final, validate_partial};
use super::tool::ToolRegistry;
use super::traits::{Agent, DocsAgent};
use crate::error::AgentError;

/// Final response emitted under [`FinalOutputPolicy::Surface`] when the
/// model never produced a valid answer.
pub const SURFACED_FAILURE_MESSAGE: &str =
    "Sorry, I could not put together a proper answer this time. Please try asking again.";

/// One step of a streamed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The answer so far, from an incomplete model output.
    Partial {
        /// Leniently validated response.
        response: StructuredResponse,
        /// Committed history at this point.
        history: ConversationHistory,
    },
    /// The complete answer.
    Final {
        /// Strictly validated response.
        response: StructuredResponse,
        /// History including the answer.
        history: ConversationHistory,
    },
    /// The turn is over.
    Finished {
        /// Complete history of the conversation after this turn.
        history: ConversationHistory,
        /// Model requests made during the turn.
        model_rounds: usize,
        /// Tool calls executed during the turn.
        tool_calls: usize,
        /// Whether a final response passed strict validation.
        validated: bool,
    },
}

impl TurnEvent {
    /// History snapshot carried by the event.
    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        match self {
            Self::Partial { history, .. }
            | Self::Final { history, .. }
            | Self::Finished { history, .. } => history,
        }
    }

    /// Response carried by the event, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&StructuredResponse> {
        match self {
            Self::Partial { response, .. } | Self::Final { response, .. } => Some(response),
            Self::Finished { .. } => None,
        }
    }
}

/// Runs conversation turns against a provider with a fixed tool registry.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    registry: ToolRegistry,
    agent: DocsAgent,
    output_retries: u32,
    final_output_policy: FinalOutputPolicy,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("tools", &self.registry.names())
            .field("agent", &self.agent)
            .field("output_retries", &self.output_retries)
            .field("final_output_policy", &self.final_output_policy)
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator.
    ///
    /// Loads the system prompt from [`AgentConfig::prompt_file`], falling
    /// back to the built-in prompt.
    pub fn new(provider: Arc<dyn LlmProvider>, registry: ToolRegistry, config: &AgentConfig) -> Self {
        let prompt = load_system_prompt(config.prompt_file.as_deref());
        let agent = DocsAgent::new(config, prompt, registry.definitions());
        Self {
            provider,
            registry,
            agent,
            output_retries: config.output_retries,
            final_output_policy: config.final_output_policy,
        }
    }

    /// Tools available to the model.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs one turn as a stream of events.
    ///
    /// The stream is lazy: nothing happens until it is polled, and dropping
    /// it cancels the model request and any tool calls in flight. A model
    /// API failure ends the stream with an error.
    pub fn run_stream<'a>(
        &'a self,
        message: &str,
        history: ConversationHistory,
    ) -> impl Stream<Item = Result<TurnEvent, AgentError>> + Send + 'a {
        let message = message.to_string();
        try_stream! {
            let mut history = history;
            history.push(user_message(&message));

            let executor = ToolExecutor::new(&self.registry);
            let mut retries_left = self.output_retries;
            let mut model_rounds = 0_usize;
            let mut tool_calls = 0_usize;
            let mut validated = false;

            info!(
                agent = self.agent.name(),
                provider = self.provider.name(),
                prior_messages = history.len() - 1,
                "turn started"
            );

            loop {
                model_rounds += 1;
                let request = self.agent.request(&history);
                let mut stream = self.provider.chat_stream(&request).await?;

                let mut text = String::new();
                let mut calls = ToolCallAccumulator::new();
                let mut finish_reason = None;
                let mut shown: Option<StructuredResponse> = None;

                while let Some(item) = stream.next().await {
                    let chunk = item?;
                    let added_text = chunk.has_text();
                    if chunk.is_truncated() {
                        warn!(round = model_rounds, "model output stopped at the token limit");
                    }
                    if let Some(reason) = chunk.finish_reason {
                        finish_reason = Some(reason);
                    }
                    if let Some(content) = chunk.content {
                        text.push_str(&content);
                    }
                    for delta in chunk.tool_calls {
                        calls.push(delta);
                    }

                    // Text of a tool-calling response is not an answer.
                    if !added_text || !calls.is_empty() {
                        continue;
                    }
                    match validate_partial(&text) {
                        Ok(response) if shown.as_ref() == Some(&response) => {}
                        Ok(response) => {
                            shown = Some(response.clone());
                            yield TurnEvent::Partial {
                                response,
                                history: history.clone(),
                            };
                        }
                        Err(failure) => debug!(error = %failure, "skipping partial output"),
                    }
                }
                debug!(round = model_rounds, finish_reason = ?finish_reason, "model response complete");

                if !calls.is_empty() {
                    let requested = calls.finish();
                    debug!(
                        round = model_rounds,
                        calls = requested.len(),
                        tools = ?requested.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                        "executing tool calls"
                    );
                    history.push(assistant_tool_calls_message(text, requested.clone()));
                    let results = executor.execute_all(&requested).await;
                    let rejected = results.iter().filter(|r| r.is_error).count();
                    if rejected > 0 {
                        warn!(round = model_rounds, rejected, "some tool calls could not be dispatched");
                    }
                    for result in results {
                        history.push(tool_message(&result.tool_call_id, &result.content));
                    }
                    tool_calls += requested.len();
                    continue;
                }

                match validate_final(&text) {
                    Ok(response) => {
                        history.push(assistant_message(&text));
                        validated = true;
                        yield TurnEvent::Final {
                            response,
                            history: history.clone(),
                        };
                        break;
                    }
                    Err(failure) if retries_left > 0 => {
                        retries_left -= 1;
                        warn!(error = %failure, retries_left, "final output invalid, asking the model again");
                        if !text.is_empty() {
                            history.push(assistant_message(&text));
                        }
                        history.push(user_message(&build_retry_prompt(&failure.message)));
                    }
                    Err(failure) => {
                        warn!(error = %failure, "final output invalid and no retries left");
                        if !text.is_empty() {
                            history.push(assistant_message(&text));
                        }
                        if self.final_output_policy == FinalOutputPolicy::Surface {
                            yield TurnEvent::Final {
                                response: StructuredResponse::new(SURFACED_FAILURE_MESSAGE),
                                history: history.clone(),
                            };
                        }
                        break;
                    }
                }
            }

            info!(model_rounds, tool_calls, validated, messages = history.len(), "turn finished");
            yield TurnEvent::Finished {
                history,
                model_rounds,
                tool_calls,
                validated,
            };
        }
    }
}
