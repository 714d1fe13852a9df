//! Connection settings for the Outline API.
//!
//! Resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigurationError;

/// Per-request timeout for Outline API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Hits requested per keyword by the search tool.
pub const DEFAULT_SEARCH_HIT_LIMIT: u32 = 5;

/// Configuration for the Outline client.
#[derive(Clone)]
pub struct OutlineConfig {
    /// Base URL of the Outline instance, without trailing `/`.
    pub base_url: String,
    /// API token sent as a bearer credential.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum hits per keyword returned by the search tool.
    pub search_hit_limit: u32,
}

impl std::fmt::Debug for OutlineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("search_hit_limit", &self.search_hit_limit)
            .finish()
    }
}

impl OutlineConfig {
    /// Creates a new builder for `OutlineConfig`.
    #[must_use]
    pub fn builder() -> OutlineConfigBuilder {
        OutlineConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the base URL or API key is absent.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`OutlineConfig`].
#[derive(Debug, Clone, Default)]
pub struct OutlineConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    search_hit_limit: Option<u32>,
}

impl OutlineConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.base_url.is_none() {
            self.base_url = std::env::var("OUTLINE_BASE_URL").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OUTLINE_API_KEY").ok();
        }
        self
    }

    /// Sets the Outline base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API token.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the per-keyword hit limit used by the search tool.
    #[must_use]
    pub const fn search_hit_limit(mut self, n: u32) -> Self {
        self.search_hit_limit = Some(n);
        self
    }

    /// Builds the [`OutlineConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Missing`] when the base URL or API key
    /// is unset or blank, and [`ConfigurationError::Invalid`] when the base
    /// URL is not an absolute http(s) URL.
    pub fn build(self) -> Result<OutlineConfig, ConfigurationError> {
        let base_url = self
            .base_url
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigurationError::Missing {
                setting: "Outline base URL",
                env_var: "OUTLINE_BASE_URL",
            })?;
        let api_key = self
            .api_key
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigurationError::Missing {
                setting: "Outline API token",
                env_var: "OUTLINE_API_KEY",
            })?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigurationError::Invalid {
            setting: "Outline base URL",
            message: format!("'{base_url}': {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::Invalid {
                setting: "Outline base URL",
                message: format!("'{base_url}' must use http or https"),
            });
        }

        Ok(OutlineConfig {
            base_url,
            api_key,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            search_hit_limit: self.search_hit_limit.unwrap_or(DEFAULT_SEARCH_HIT_LIMIT),
        })
    }
}
