//! # outline-assistant
//!
//! A conversational assistant over the documents stored in Outline.
//!
//! A language model answers questions by calling three retrieval tools
//! (fetch a document, search by several keywords at once, look up the
//! current page) and streams back its answer, validated as it grows.
//!
//! ## Modules
//!
//! - [`outline`]: REST client for the document service
//! - [`tools`]: retrieval tools exposed to the model
//! - [`agent`]: provider abstraction and the streaming turn orchestrator
//! - [`chat`]: consumer loop forwarding answers to a sink
//! - [`cli`]: command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use outline_assistant::agent::{AgentConfig, Orchestrator, create_provider};
//! use outline_assistant::chat::{RecordingSink, SessionHistory, respond};
//! use outline_assistant::outline::{OutlineClient, OutlineConfig};
//! use outline_assistant::tools::{PageCapability, retrieval_tools};
//!
//! # async fn run() -> outline_assistant::Result<()> {
//! let outline = OutlineConfig::from_env()?;
//! let client = Arc::new(OutlineClient::new(&outline)?);
//! let config = AgentConfig::from_env()?;
//!
//! let registry = retrieval_tools(client, outline.search_hit_limit, config.max_keywords, PageCapability::Unavailable);
//! let orchestrator = Orchestrator::new(create_provider(&config)?, registry, &config);
//!
//! let mut sink = RecordingSink::default();
//! let mut history = SessionHistory::new();
//! let summary = respond(&orchestrator, "What is the Q3 roadmap?", &mut sink, &mut history).await?;
//! # let _ = summary;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod cli;
pub mod error;
pub mod outline;
pub mod tools;

pub use error::{Error, Result};
