//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;

use crate::error::{AgentError, ConfigurationError};
use crate::tools::search::DEFAULT_MAX_KEYWORDS;

/// Default model for the assistant.
pub const DEFAULT_MODEL: &str = "gpt-4.1";
/// Default output validation retries per turn.
const DEFAULT_OUTPUT_RETRIES: u32 = 3;
/// Default maximum tokens per model response.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// What a turn does when the final output never validates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FinalOutputPolicy {
    /// Log the failure and end the turn without a final response.
    #[default]
    Silent,
    /// Log the failure and emit a fixed apology as the final response.
    Surface,
}

impl std::str::FromStr for FinalOutputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "surface" => Ok(Self::Surface),
            other => Err(format!("unknown final output policy: {other}")),
        }
    }
}

/// Configuration for the assistant agent.
#[derive(Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens per model response.
    pub max_tokens: u32,
    /// How many times a failed final output is sent back to the model.
    pub output_retries: u32,
    /// Keyword count advertised by `search_docs`.
    pub max_keywords: usize,
    /// File to load the system prompt from instead of the built-in one.
    pub prompt_file: Option<PathBuf>,
    /// Behaviour when the final output never validates.
    pub final_output_policy: FinalOutputPolicy,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("output_retries", &self.output_retries)
            .field("max_keywords", &self.max_keywords)
            .field("prompt_file", &self.prompt_file)
            .field("final_output_policy", &self.final_output_policy)
            .finish()
    }
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    output_retries: Option<u32>,
    max_keywords: Option<usize>,
    prompt_file: Option<PathBuf>,
    final_output_policy: Option<FinalOutputPolicy>,
    invalid: Option<ConfigurationError>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    ///
    /// Values that cannot be parsed are reported by [`build`](Self::build).
    #[must_use]
    pub fn from_env(self) -> Self {
        self.with_env(|name| std::env::var(name).ok())
    }

    /// Populates unset fields from `lookup`, called with variable names.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.provider.is_none() {
            self.provider = lookup("OUTLINE_AGENT_PROVIDER");
        }
        if self.api_key.is_none() {
            self.api_key = lookup("OPENAI_API_KEY");
        }
        if self.base_url.is_none() {
            self.base_url = lookup("OPENAI_BASE_URL");
        }
        if self.model.is_none() {
            self.model = lookup("OUTLINE_AGENT_MODEL");
        }
        if self.output_retries.is_none()
            && let Some(value) = lookup("OUTLINE_AGENT_OUTPUT_RETRIES")
        {
            match value.trim().parse() {
                Ok(n) => self.output_retries = Some(n),
                Err(e) => {
                    self.reject("OUTLINE_AGENT_OUTPUT_RETRIES", format!("{value:?}: {e}"));
                }
            }
        }
        if self.prompt_file.is_none() {
            self.prompt_file = lookup("OUTLINE_AGENT_PROMPT_FILE").map(PathBuf::from);
        }
        if self.final_output_policy.is_none()
            && let Some(value) = lookup("OUTLINE_AGENT_FINAL_OUTPUT")
        {
            match value.trim().parse() {
                Ok(policy) => self.final_output_policy = Some(policy),
                Err(e) => self.reject("OUTLINE_AGENT_FINAL_OUTPUT", e),
            }
        }
        self
    }

    /// Keeps the first unusable setting for `build` to report.
    fn reject(&mut self, setting: &'static str, message: String) {
        if self.invalid.is_none() {
            self.invalid = Some(ConfigurationError::Invalid { setting, message });
        }
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the max tokens per response.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the output retry budget.
    #[must_use]
    pub const fn output_retries(mut self, n: u32) -> Self {
        self.output_retries = Some(n);
        self
    }

    /// Sets the keyword count advertised to the model.
    #[must_use]
    pub const fn max_keywords(mut self, n: usize) -> Self {
        self.max_keywords = Some(n);
        self
    }

    /// Sets the system prompt file.
    #[must_use]
    pub fn prompt_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_file = Some(path.into());
        self
    }

    /// Sets the final output policy.
    #[must_use]
    pub const fn final_output_policy(mut self, policy: FinalOutputPolicy) -> Self {
        self.final_output_policy = Some(policy);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Configuration`] if an environment value could
    /// not be parsed, and [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        if let Some(invalid) = self.invalid {
            return Err(invalid.into());
        }
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            output_retries: self.output_retries.unwrap_or(DEFAULT_OUTPUT_RETRIES),
            max_keywords: self.max_keywords.unwrap_or(DEFAULT_MAX_KEYWORDS),
            prompt_file: self.prompt_file,
            final_output_policy: self.final_output_policy.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.output_retries, 3);
        assert_eq!(config.max_keywords, 10);
        assert_eq!(config.final_output_policy, FinalOutputPolicy::Silent);
    }

    #[test]
    fn test_builder_missing_api_key() {
        assert!(matches!(
            AgentConfig::builder().build(),
            Err(AgentError::ApiKeyMissing)
        ));
        assert!(AgentConfig::builder().api_key("  ").build().is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .model("gpt-4o-mini")
            .output_retries(1)
            .max_keywords(4)
            .final_output_policy(FinalOutputPolicy::Surface)
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.output_retries, 1);
        assert_eq!(config.max_keywords, 4);
        assert_eq!(config.final_output_policy, FinalOutputPolicy::Surface);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AgentConfig::builder()
            .api_key("sk-secret")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(!format!("{config:?}").contains("sk-secret"));
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_env_values_are_parsed() {
        let config = AgentConfig::builder()
            .with_env(env(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("OUTLINE_AGENT_OUTPUT_RETRIES", " 5 "),
                ("OUTLINE_AGENT_FINAL_OUTPUT", "surface"),
            ]))
            .build()
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.output_retries, 5);
        assert_eq!(config.final_output_policy, FinalOutputPolicy::Surface);
    }

    #[test]
    fn test_unparsable_env_values_are_rejected() {
        let err = AgentConfig::builder()
            .with_env(env(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("OUTLINE_AGENT_OUTPUT_RETRIES", "x"),
            ]))
            .build()
            .err();
        assert!(matches!(
            err,
            Some(AgentError::Configuration(ConfigurationError::Invalid {
                setting: "OUTLINE_AGENT_OUTPUT_RETRIES",
                ..
            }))
        ));

        let err = AgentConfig::builder()
            .with_env(env(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("OUTLINE_AGENT_FINAL_OUTPUT", "bogus"),
            ]))
            .build()
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("OUTLINE_AGENT_FINAL_OUTPUT"));
        assert!(err.contains("bogus"));
    }

    #[test]
    fn test_explicit_value_wins_over_bad_env() {
        let config = AgentConfig::builder()
            .output_retries(1)
            .with_env(env(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("OUTLINE_AGENT_OUTPUT_RETRIES", "x"),
            ]))
            .build()
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(config.output_retries, 1);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Surface".parse(), Ok(FinalOutputPolicy::Surface));
        assert_eq!("silent".parse(), Ok(FinalOutputPolicy::Silent));
        assert!("loud".parse::<FinalOutputPolicy>().is_err());
    }
}
