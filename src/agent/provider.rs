//! Pluggable LLM provider trait.
//!
//! Implementations translate a provider-agnostic [`ChatRequest`] into
//! provider-specific SDK calls and stream back [`StreamChunk`]s. This keeps
//! all orchestration logic decoupled from any particular LLM vendor.

use std::collections::BTreeMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use super::message::ChatRequest;
use super::tool::ToolCall;
use crate::error::AgentError;

/// Stream of response chunks from a provider.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AgentError>> + Send>>;

/// Fragment of a tool call carried by one chunk.
///
/// The first fragment for an index usually carries the ID and name; later
/// fragments append to the arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallDelta {
    /// Position of the call within the response.
    pub index: u32,
    /// Call ID, when present in this fragment.
    pub id: Option<String>,
    /// Tool name, when present in this fragment.
    pub name: Option<String>,
    /// Argument text to append.
    pub arguments: Option<String>,
}

/// One increment of a streamed model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    /// Text to append to the response.
    pub content: Option<String>,
    /// Tool call fragments.
    pub tool_calls: Vec<ToolCallDelta>,
    /// Why generation stopped, on the last chunk.
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    /// A chunk carrying only text.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A chunk carrying one complete tool call.
    #[must_use]
    pub fn tool_call(index: u32, id: &str, name: &str, arguments: &str) -> Self {
        Self {
            tool_calls: vec![ToolCallDelta {
                index,
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                arguments: Some(arguments.to_string()),
            }],
            ..Self::default()
        }
    }

    /// Returns `true` if the chunk adds response text.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Returns `true` if generation stopped at the token limit.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

#[derive(Debug, Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

/// Assembles tool calls from streamed fragments.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<u32, PartialCall>,
}

impl ToolCallAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a fragment into the call at its index.
    pub fn push(&mut self, delta: ToolCallDelta) {
        let call = self.calls.entry(delta.index).or_default();
        if let Some(id) = delta.id {
            call.id = id;
        }
        if let Some(name) = delta.name {
            call.name.push_str(&name);
        }
        if let Some(arguments) = delta.arguments {
            call.arguments.push_str(&arguments);
        }
    }

    /// Returns `true` if no fragments have been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Completed calls, ordered by index.
    #[must_use]
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .map(|(index, call)| ToolCall {
                id: if call.id.is_empty() {
                    format!("call_{index}")
                } else {
                    call.id
                },
                name: call.name,
                arguments: call.arguments,
            })
            .collect()
    }
}

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls, retries)
/// for a specific provider while presenting a uniform interface to the
/// orchestrator.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Starts a streaming chat completion.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the request cannot be started. Failures
    /// after that surface as error items in the stream.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_merges_fragments() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(ToolCallDelta {
            index: 0,
            id: Some("call_a".to_string()),
            name: Some("search_docs".to_string()),
            arguments: Some("{\"keywords\":".to_string()),
        });
        acc.push(ToolCallDelta {
            index: 0,
            arguments: Some("[\"roadmap\"]}".to_string()),
            ..ToolCallDelta::default()
        });
        let calls = acc.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments, r#"{"keywords":["roadmap"]}"#);
    }

    #[test]
    fn test_accumulator_orders_by_index() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(ToolCallDelta {
            index: 1,
            name: Some("get_current_page_url".to_string()),
            ..ToolCallDelta::default()
        });
        acc.push(ToolCallDelta {
            index: 0,
            id: Some("first".to_string()),
            name: Some("search_docs".to_string()),
            ..ToolCallDelta::default()
        });
        let calls = acc.finish();
        assert_eq!(calls[0].name, "search_docs");
        assert_eq!(calls[1].id, "call_1");
    }

    #[test]
    fn test_chunk_has_text() {
        assert!(StreamChunk::text("a").has_text());
        assert!(!StreamChunk::text("").has_text());
        assert!(!StreamChunk::tool_call(0, "c", "t", "{}").has_text());
    }

    #[test]
    fn test_chunk_truncation_from_finish_reason() {
        let mut chunk = StreamChunk::text("partial");
        assert!(!chunk.is_truncated());
        chunk.finish_reason = Some("stop".to_string());
        assert!(!chunk.is_truncated());
        chunk.finish_reason = Some("length".to_string());
        assert!(chunk.is_truncated());
    }
}
