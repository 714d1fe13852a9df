//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::{AgentConfig, Orchestrator, create_provider};
use crate::chat::{RecordingSink, SessionHistory, TurnSummary, WriterSink, respond};
use crate::cli::output::OutputFormat;
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};
use crate::outline::{
    DocumentService, OutlineClient, OutlineConfig, SearchQuery, documents_to_markdown,
    normalize_document_id,
};
use crate::tools::{
    PageCapability, RetrievalOutcome, fetch_document, matched_documents, retrieval_tools,
    search_keywords_in, search_report_markdown,
};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. Streaming commands write their
/// answers as they arrive and return what is left to print.
///
/// # Errors
///
/// Returns an error if configuration is missing, the document service or
/// the model API fails, or output cannot be written.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask { message } => cmd_ask(cli, message, format),
        Commands::Chat => cmd_chat(cli, format),
        Commands::Fetch { doc_url } => cmd_fetch(doc_url, format),
        Commands::Search {
            keywords,
            collection,
            document,
            offset,
            list,
        } => {
            let scope = SearchScope {
                collection: collection.as_deref(),
                document: document.as_deref(),
                offset: *offset,
            };
            cmd_search(keywords, &scope, *list, format)
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn outline_client() -> Result<(OutlineConfig, OutlineClient)> {
    let config = OutlineConfig::from_env()?;
    let client = OutlineClient::new(&config)?;
    Ok((config, client))
}

fn page_capability(cli: &Cli) -> PageCapability {
    cli.page_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map_or(PageCapability::Unavailable, PageCapability::fixed)
}

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let (outline, client) = outline_client()?;

    let mut builder = AgentConfig::builder();
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    let config = builder.from_env().build()?;
    let provider = create_provider(&config)?;

    let service: Arc<dyn DocumentService> = Arc::new(client);
    let registry = retrieval_tools(
        service,
        outline.search_hit_limit,
        config.max_keywords,
        page_capability(cli),
    );
    info!(
        model = %config.model,
        provider = provider.name(),
        tools = ?registry.names(),
        "assistant ready"
    );
    Ok(Orchestrator::new(provider, registry, &config))
}

/// Runs one turn, cancelling it on Ctrl-C.
fn run_turn(
    rt: &tokio::runtime::Runtime,
    orchestrator: &Orchestrator,
    message: &str,
    sink: &mut (dyn crate::chat::ResponseSink),
    store: &mut SessionHistory,
) -> Result<Option<TurnSummary>> {
    rt.block_on(async {
        tokio::select! {
            result = respond(orchestrator, message, sink, store) => result.map(Some),
            _ = tokio::signal::ctrl_c() => {
                warn!("turn cancelled");
                Ok(None)
            }
        }
    })
}

fn summary_note(summary: &TurnSummary) -> Option<&'static str> {
    summary
        .response
        .is_none()
        .then_some("(no valid answer was produced; try rephrasing the question)")
}

fn cmd_ask(cli: &Cli, message: &str, format: OutputFormat) -> Result<String> {
    let orchestrator = build_orchestrator(cli)?;
    let rt = runtime()?;
    let mut store = SessionHistory::new();

    match format {
        OutputFormat::Text => {
            let mut sink = WriterSink::new(io::stdout());
            let summary = run_turn(&rt, &orchestrator, message, &mut sink, &mut store)?;
            Ok(summary
                .as_ref()
                .and_then(summary_note)
                .unwrap_or_default()
                .to_string())
        }
        OutputFormat::Json => {
            let mut sink = RecordingSink::default();
            let summary = run_turn(&rt, &orchestrator, message, &mut sink, &mut store)?;
            Ok(format.to_json(&summary))
        }
    }
}

fn cmd_chat(cli: &Cli, format: OutputFormat) -> Result<String> {
    let orchestrator = build_orchestrator(cli)?;
    let rt = runtime()?;
    let mut store = SessionHistory::new();
    let mut stdout = io::stdout();
    let mut turns = 0_usize;

    writeln!(stdout, "Ask about your documents. Type `exit` to quit.")
        .map_err(CommandError::from)?;

    for line in io::stdin().lock().lines() {
        let line = line.map_err(CommandError::from)?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        let summary = match format {
            OutputFormat::Text => {
                let mut sink = WriterSink::new(io::stdout());
                run_turn(&rt, &orchestrator, message, &mut sink, &mut store)?
            }
            OutputFormat::Json => {
                let mut sink = RecordingSink::default();
                let summary = run_turn(&rt, &orchestrator, message, &mut sink, &mut store)?;
                if let Some(summary) = &summary {
                    writeln!(stdout, "{}", format.to_json(summary)).map_err(CommandError::from)?;
                }
                summary
            }
        };
        if let Some(note) = summary.as_ref().and_then(summary_note)
            && format == OutputFormat::Text
        {
            writeln!(stdout, "{note}").map_err(CommandError::from)?;
        }
        turns += 1;
    }

    let messages = store.get().map_or(0, |h| h.len());
    info!(turns, messages, "chat session ended");
    Ok(String::new())
}

fn cmd_fetch(doc_url: &str, format: OutputFormat) -> Result<String> {
    let (_, client) = outline_client()?;
    let rt = runtime()?;

    match rt.block_on(fetch_document(&client, doc_url)) {
        RetrievalOutcome::Found(document) => match format {
            OutputFormat::Text => Ok(document.to_markdown(client.base_url())),
            OutputFormat::Json => Ok(format.to_json(&document)),
        },
        RetrievalOutcome::Failed(err) => Err(CommandError::ExecutionFailed(err.message).into()),
    }
}

/// Restrictions applied to every keyword of a `search` command.
#[derive(Debug, Default)]
struct SearchScope<'a> {
    collection: Option<&'a str>,
    document: Option<&'a str>,
    offset: u32,
}

impl SearchScope<'_> {
    fn to_query(&self, hit_limit: u32) -> SearchQuery {
        let mut query = SearchQuery::new("").limit(hit_limit).offset(self.offset);
        if let Some(collection) = self.collection.map(str::trim).filter(|c| !c.is_empty()) {
            query = query.collection(collection);
        }
        if let Some(document) = self.document.map(str::trim).filter(|d| !d.is_empty()) {
            query = query.document(normalize_document_id(document));
        }
        query
    }
}

fn cmd_search(
    keywords: &[String],
    scope: &SearchScope<'_>,
    list: bool,
    format: OutputFormat,
) -> Result<String> {
    let (config, client) = outline_client()?;
    let rt = runtime()?;

    let query = scope.to_query(config.search_hit_limit);
    let results = rt.block_on(search_keywords_in(&client, keywords.iter().cloned(), &query));

    if list {
        let documents = matched_documents(&results);
        return match format {
            OutputFormat::Text => Ok(documents_to_markdown(&documents, client.base_url())),
            OutputFormat::Json => Ok(format.to_json(&documents)),
        };
    }

    match format {
        OutputFormat::Text => Ok(search_report_markdown(&results, client.base_url())),
        OutputFormat::Json => Ok(format.to_json(&results)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("outline-assistant").chain(args.iter().copied()))
            .unwrap_or_else(|e| unreachable!("{e}"))
    }

    #[test]
    fn test_page_capability_from_flag() {
        let with_page = cli(&["--page-url", "https://docs.example.com/doc/a", "chat"]);
        assert!(matches!(page_capability(&with_page), PageCapability::Copilot(_)));

        let blank = cli(&["--page-url", "  ", "chat"]);
        assert!(matches!(page_capability(&blank), PageCapability::Unavailable));
    }

    #[test]
    fn test_search_scope_to_query() {
        let scope = SearchScope {
            collection: Some(" col-1 "),
            document: Some("https://docs.example.com/doc/handbook-xyz"),
            offset: 10,
        };
        let query = scope.to_query(5);
        assert_eq!(query.limit, 5);
        assert_eq!(query.offset, 10);
        assert_eq!(query.collection_id.as_deref(), Some("col-1"));
        assert_eq!(query.document_id.as_deref(), Some("handbook-xyz"));

        let unscoped = SearchScope::default().to_query(5);
        assert_eq!(unscoped, SearchQuery::new("").limit(5));
    }

    #[test]
    fn test_summary_note_only_without_answer() {
        let mut summary = TurnSummary::default();
        assert!(summary_note(&summary).is_some());
        summary.response = Some(crate::agent::StructuredResponse::new("ok"));
        assert!(summary_note(&summary).is_none());
    }
}
