//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};

/// outline-assistant: ask questions about the documents in Outline.
///
/// Streams answers from a language model that searches and reads the
/// knowledge base through a small set of retrieval tools.
#[derive(Parser, Debug)]
#[command(name = "outline-assistant")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// URL of the page the user is looking at.
    ///
    /// Enables the `get_current_page_url` tool, as in an embedded copilot.
    #[arg(long, env = "OUTLINE_PAGE_URL", global = true)]
    pub page_url: Option<String>,

    /// Model to use instead of the configured one.
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and stream the answer.
    #[command(after_help = r#"Examples:
  outline-assistant ask "What is the Q3 roadmap?"
  outline-assistant --page-url https://docs.example.com/doc/q3-roadmap-abc ask "Summarize this page"
  outline-assistant --format json ask "Who owns onboarding?" | jq .response.message
"#)]
    Ask {
        /// The question.
        message: String,
    },

    /// Start an interactive conversation.
    ///
    /// Reads one message per line from stdin. History is kept in memory
    /// until the session ends (`exit`, `quit` or end of input).
    Chat,

    /// Fetch a document by URL, path or ID.
    #[command(after_help = r#"Examples:
  outline-assistant fetch https://docs.example.com/doc/onboarding-guide-6RwQmlbrCu
  outline-assistant fetch /doc/onboarding-guide-6RwQmlbrCu
  outline-assistant --format json fetch 6RwQmlbrCu
"#)]
    Fetch {
        /// Document URL, path or ID.
        doc_url: String,
    },

    /// Search documents for one or more keywords.
    #[command(after_help = r#"Examples:
  outline-assistant search roadmap "Q3 goals"
  outline-assistant search --collection 3f2a9c1e --offset 10 roadmap
  outline-assistant search --document /doc/handbook-xyz --list holidays
  outline-assistant --format json search onboarding | jq 'keys'
"#)]
    Search {
        /// Keywords to search; each is searched separately.
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Only search the collection with this ID.
        #[arg(long)]
        collection: Option<String>,

        /// Only search this document and its children (URL, path or ID).
        #[arg(long)]
        document: Option<String>,

        /// Skip this many hits per keyword.
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Print the distinct matched documents instead of the per-keyword report.
        #[arg(long)]
        list: bool,
    },
}
