//! Consumer loop: runs a turn and forwards its answers to a sink.
//!
//! A [`ResponseSink`] receives the full visible answer each time it
//! changes; a [`HistoryStore`] keeps the conversation between turns.

use std::io::Write;
use std::pin::pin;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use tracing::debug;

use crate::agent::{ConversationHistory, Orchestrator, StructuredResponse, TurnEvent};
use crate::error::{CommandError, Result};

/// Destination of the answer shown to the user.
#[async_trait]
pub trait ResponseSink: Send {
    /// Replaces the visible answer with `markdown`.
    async fn replace(&mut self, markdown: &str) -> std::io::Result<()>;

    /// Called once after the last update of a turn.
    async fn finish(&mut self) -> std::io::Result<()>;
}

/// Where the conversation is kept between turns.
pub trait HistoryStore: Send {
    /// History to continue from; empty for a new conversation.
    fn load(&self) -> ConversationHistory;

    /// Stores the history after a turn.
    fn save(&mut self, history: ConversationHistory);
}

/// In-memory history for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    history: Option<ConversationHistory>,
}

impl SessionHistory {
    /// Creates an empty session.
    #[must_use]
    pub const fn new() -> Self {
        Self { history: None }
    }

    /// Stored history, if any turn has completed.
    #[must_use]
    pub const fn get(&self) -> Option<&ConversationHistory> {
        self.history.as_ref()
    }
}

impl HistoryStore for SessionHistory {
    fn load(&self) -> ConversationHistory {
        self.history.clone().unwrap_or_default()
    }

    fn save(&mut self, history: ConversationHistory) {
        self.history = Some(history);
    }
}

/// Sink writing to a terminal-like stream.
///
/// A terminal cannot take back printed text, so when the new answer extends
/// the shown one only the new suffix is written. Otherwise the whole answer
/// is printed again on a fresh line.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: W,
    shown: String,
}

impl<W: Write + Send> WriterSink<W> {
    /// Creates a sink over `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
        }
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send> ResponseSink for WriterSink<W> {
    async fn replace(&mut self, markdown: &str) -> std::io::Result<()> {
        if let Some(suffix) = markdown.strip_prefix(self.shown.as_str()) {
            self.out.write_all(suffix.as_bytes())?;
        } else {
            if !self.shown.is_empty() {
                self.out.write_all(b"\n")?;
            }
            self.out.write_all(markdown.as_bytes())?;
        }
        self.out.flush()?;
        self.shown.clear();
        self.shown.push_str(markdown);
        Ok(())
    }

    async fn finish(&mut self) -> std::io::Result<()> {
        if !self.shown.is_empty() {
            self.out.write_all(b"\n")?;
        }
        self.shown.clear();
        self.out.flush()
    }
}

/// Sink that records every update.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Answers in the order they were shown.
    pub updates: Vec<String>,
    /// Number of completed turns.
    pub finished: usize,
}

impl RecordingSink {
    /// The answer currently shown.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.updates.last().map(String::as_str)
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn replace(&mut self, markdown: &str) -> std::io::Result<()> {
        self.updates.push(markdown.to_string());
        Ok(())
    }

    async fn finish(&mut self) -> std::io::Result<()> {
        self.finished += 1;
        Ok(())
    }
}

/// Outcome of one consumed turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    /// Final answer, if one was produced.
    pub response: Option<StructuredResponse>,
    /// Partial answers forwarded before the final one.
    pub partial_updates: usize,
    /// Model requests made.
    pub model_rounds: usize,
    /// Tool calls executed.
    pub tool_calls: usize,
    /// Whether the final answer passed strict validation.
    pub validated: bool,
    /// Messages in the stored history.
    pub history_len: usize,
}

/// Sends `response` to the sink unless it is already shown.
async fn forward<S>(
    sink: &mut S,
    shown: &mut Option<String>,
    response: &StructuredResponse,
) -> Result<()>
where
    S: ResponseSink + ?Sized,
{
    let markdown = response.to_markdown();
    if shown.as_deref() != Some(markdown.as_str()) {
        sink.replace(&markdown).await.map_err(CommandError::from)?;
        *shown = Some(markdown);
    }
    Ok(())
}

/// Runs one turn for `message` and forwards every answer to `sink`.
///
/// The history is loaded from `store` before the turn and saved back after
/// it, unless the turn left it empty.
///
/// # Errors
///
/// Returns an error if the model API fails during the turn (nothing is
/// saved then) or the sink cannot be written.
pub async fn respond<S, H>(
    orchestrator: &Orchestrator,
    message: &str,
    sink: &mut S,
    store: &mut H,
) -> Result<TurnSummary>
where
    S: ResponseSink + ?Sized,
    H: HistoryStore + ?Sized,
{
    let mut events = pin!(orchestrator.run_stream(message, store.load()));
    let mut summary = TurnSummary::default();
    let mut latest: Option<ConversationHistory> = None;
    let mut shown: Option<String> = None;

    while let Some(event) = events.next().await {
        match event? {
            TurnEvent::Partial { response, history } => {
                forward(sink, &mut shown, &response).await?;
                summary.partial_updates += 1;
                latest = Some(history);
            }
            TurnEvent::Final { response, history } => {
                forward(sink, &mut shown, &response).await?;
                summary.response = Some(response);
                latest = Some(history);
            }
            TurnEvent::Finished {
                history,
                model_rounds,
                tool_calls,
                validated,
            } => {
                summary.model_rounds = model_rounds;
                summary.tool_calls = tool_calls;
                summary.validated = validated;
                latest = Some(history);
            }
        }
    }
    sink.finish().await.map_err(CommandError::from)?;

    if let Some(history) = latest.filter(|h| !h.is_empty()) {
        summary.history_len = history.len();
        store.save(history);
    }
    debug!(?summary, "turn consumed");
    Ok(summary)
}
