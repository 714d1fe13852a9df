//! Error types for outline-assistant.
//!
//! Each layer has its own error enum. Tool-level failures are not listed
//! here as errors: they are returned to the model as
//! [`RetrievalError`](crate::tools::RetrievalError) values.

use thiserror::Error;

/// Result alias used by the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for command execution.
#[derive(Debug, Error)]
pub enum Error {
    /// Required connection settings are missing or invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The document service could not be reached or answered with a failure.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The agent could not complete a turn.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// A CLI command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Missing or malformed connection settings.
///
/// Raised once at construction time; never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required setting has no value.
    #[error("{setting} is required. Set {env_var} or pass it explicitly.")]
    Missing {
        /// Human-readable setting name.
        setting: &'static str,
        /// Environment variable that supplies the setting.
        env_var: &'static str,
    },

    /// A setting has a value that cannot be used.
    #[error("invalid {setting}: {message}")]
    Invalid {
        /// Human-readable setting name.
        setting: &'static str,
        /// What is wrong with the value.
        message: String,
    },
}

/// Failure talking to the document service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// API endpoint (e.g. `documents.info`).
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The request could not be sent or timed out.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// API endpoint.
        endpoint: &'static str,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected shape.
    #[error("could not decode {endpoint} response: {message}")]
    Decode {
        /// API endpoint.
        endpoint: &'static str,
        /// Decoder message.
        message: String,
    },
}

/// Which validator rejected the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Lenient validation of an incomplete stream.
    Partial,
    /// Strict validation of the completed output.
    Final,
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Partial => f.write_str("partial"),
            Self::Final => f.write_str("final"),
        }
    }
}

/// The streamed model output could not be coerced into a structured response.
///
/// Recovered by the orchestrator (logged), never surfaced as an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage} output validation failed: {message}")]
pub struct ValidationFailure {
    /// Validator that rejected the output.
    pub stage: ValidationStage,
    /// Why the output was rejected.
    pub message: String,
}

/// Errors from the agent system.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key available for the model provider.
    #[error("model API key is required. Set OPENAI_API_KEY or pass it explicitly.")]
    ApiKeyMissing,

    /// An agent setting has a value that cannot be used.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Provider name not recognised.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Configured provider name.
        name: String,
    },

    /// The model API rejected or failed a request.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error message.
        message: String,
        /// HTTP status, if known.
        status: Option<u16>,
    },

    /// The model response stream broke off.
    #[error("stream error: {message}")]
    Stream {
        /// Error message.
        message: String,
    },

    /// A tool call could not be dispatched.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Error message.
        message: String,
    },
}

/// CLI command failures.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not run.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
