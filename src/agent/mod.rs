//! Streaming, tool-augmented assistant agent.
//!
//! Uses a pluggable provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! user message → Orchestrator::run_stream
//!   ├── DocsAgent builds each request (system prompt + history + tools)
//!   ├── LlmProvider streams chunks
//!   │   ├── text       → lenient validation → TurnEvent::Partial
//!   │   ├── tool calls → ToolExecutor::execute_all → next request
//!   │   └── last chunk → strict validation  → TurnEvent::Final (or retry)
//!   └── TurnEvent::Finished with the complete history
//! ```

pub mod client;
pub mod config;
pub mod executor;
pub mod message;
pub mod orchestrator;
pub mod partial_json;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod response;
pub mod tool;
pub mod traits;

// Re-export key types
pub use client::create_provider;
pub use config::{AgentConfig, FinalOutputPolicy};
pub use executor::ToolExecutor;
pub use message::{ChatMessage, ChatRequest, ConversationHistory, Role};
pub use orchestrator::{Orchestrator, TurnEvent};
pub use provider::{ChunkStream, LlmProvider, StreamChunk, ToolCallDelta};
pub use response::{StructuredResponse, validate_final, validate_partial};
pub use tool::{DynTool, Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
pub use traits::{Agent, DocsAgent};
