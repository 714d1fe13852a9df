//! `get_current_page_url`: URL of the page the user is looking at.
//!
//! Only an embedded (copilot) session knows the page. The capability is
//! handed to the tool when it is built; without it the tool answers with a
//! fixed error text rather than failing.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::warn;

use super::RetrievalError;
use crate::agent::tool::Tool;

/// Text returned when the session cannot report a page URL.
pub const PAGE_URL_UNAVAILABLE: &str = "Error: Current page URL is not available in this context.";

/// Source of the current page URL in an embedded session.
#[async_trait]
pub trait PageLocator: Send + Sync {
    /// Asks the host page for its URL.
    async fn current_page_url(&self) -> Result<String, RetrievalError>;
}

/// A page locator with a URL fixed at session start.
#[derive(Debug, Clone)]
pub struct StaticPageLocator(pub String);

#[async_trait]
impl PageLocator for StaticPageLocator {
    async fn current_page_url(&self) -> Result<String, RetrievalError> {
        Ok(self.0.clone())
    }
}

/// Whether the session can report the current page.
#[derive(Clone, Default)]
pub enum PageCapability {
    /// Plain chat session; no page context.
    #[default]
    Unavailable,
    /// Embedded copilot session with a way to ask the host page.
    Copilot(Arc<dyn PageLocator>),
}

impl PageCapability {
    /// Copilot capability with a fixed page URL.
    pub fn fixed(url: impl Into<String>) -> Self {
        Self::Copilot(Arc::new(StaticPageLocator(url.into())))
    }
}

impl std::fmt::Debug for PageCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("Unavailable"),
            Self::Copilot(_) => f.write_str("Copilot"),
        }
    }
}

/// `get_current_page_url` takes no arguments.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CurrentPageInput {}

/// Tool that reports the current page URL.
#[derive(Debug, Clone, Default)]
pub struct CurrentPageUrl {
    capability: PageCapability,
}

impl CurrentPageUrl {
    /// Creates the tool with the session's capability.
    pub const fn new(capability: PageCapability) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl Tool for CurrentPageUrl {
    type Input = CurrentPageInput;
    type Output = String;
    const NAME: &'static str = "get_current_page_url";

    fn description(&self) -> String {
        "Get the URL of the page the user currently has open. Returns the URL, or an error \
         message when it is not available."
            .to_string()
    }

    async fn call(&self, _input: CurrentPageInput) -> String {
        match &self.capability {
            PageCapability::Unavailable => PAGE_URL_UNAVAILABLE.to_string(),
            PageCapability::Copilot(locator) => match locator.current_page_url().await {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "page locator failed");
                    PAGE_URL_UNAVAILABLE.to_string()
                }
            },
        }
    }
}
