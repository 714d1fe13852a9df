//! Agent trait definition.
//!
//! An agent is a fixed role: a model, a system prompt and the tools it may
//! call. The orchestrator asks it for a [`ChatRequest`] on every model
//! round and drives the rest.

use super::config::AgentConfig;
use super::message::{ChatRequest, ConversationHistory, system_message};
use super::tool::ToolDefinition;

/// Trait implemented by agents driven by the orchestrator.
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature, or `None` for the provider default.
    fn temperature(&self) -> Option<f32> {
        None
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Tool definitions available to this agent.
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Builds the request for one model round: system prompt, then history.
    fn request(&self, history: &ConversationHistory) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(system_message(self.system_prompt()));
        messages.extend_from_slice(history.messages());
        ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: self.temperature(),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
            tools: self.tools(),
        }
    }
}

/// The documentation assistant.
#[derive(Debug, Clone)]
pub struct DocsAgent {
    model: String,
    system_prompt: String,
    temperature: Option<f32>,
    max_tokens: u32,
    tools: Vec<ToolDefinition>,
}

impl DocsAgent {
    /// Creates the agent with the given prompt and tool definitions.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String, tools: Vec<ToolDefinition>) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            tools,
        }
    }
}

impl Agent for DocsAgent {
    fn name(&self) -> &'static str {
        "docs"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.clone()
    }
}
