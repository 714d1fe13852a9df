//! CLI layer for outline-assistant.
//!
//! Provides the command-line interface using clap: one-shot and
//! interactive conversations, plus direct access to the retrieval tools.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
