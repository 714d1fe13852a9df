//! Retrieval tools exposed to the assistant model.
//!
//! Three tools are available:
//!
//! - [`GetDocumentByUrl`] (`get_doc_by_url`) fetches a full document.
//! - [`SearchDocuments`] (`search_docs`) runs one concurrent search per keyword.
//! - [`CurrentPageUrl`] (`get_current_page_url`) reports the page the user is on,
//!   when the session has that capability.
//!
//! Tools never fail. A failed retrieval is returned as a [`RetrievalError`]
//! value so the model can read it and react.

pub mod document;
#[cfg(test)]
pub(crate) mod mock;
pub mod page;
pub mod search;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::tool::ToolRegistry;
use crate::outline::DocumentService;

pub use document::{GetDocumentByUrl, fetch_document};
pub use page::{CurrentPageUrl, PageCapability, PageLocator, StaticPageLocator};
pub use search::{
    KeywordResults, SearchDocuments, matched_documents, search_keywords, search_keywords_in,
    search_report_markdown,
};

/// A failed retrieval, reported to the model as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RetrievalError {
    /// What failed, on which subject, and why.
    pub message: String,
}

impl RetrievalError {
    /// Creates a retrieval error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Either the retrieved value or the error that replaced it.
///
/// Serialized untagged: the model sees the value itself or `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetrievalOutcome<T> {
    /// Retrieval succeeded.
    Found(T),
    /// Retrieval failed.
    Failed(RetrievalError),
}

impl<T> RetrievalOutcome<T> {
    /// Returns `true` for a failed retrieval.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Converts into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the contained [`RetrievalError`] for a failed retrieval.
    pub fn into_result(self) -> Result<T, RetrievalError> {
        match self {
            Self::Found(value) => Ok(value),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Builds the registry of the three retrieval tools.
pub fn retrieval_tools(
    service: Arc<dyn DocumentService>,
    hit_limit: u32,
    max_keywords: usize,
    page: PageCapability,
) -> ToolRegistry {
    ToolRegistry::none()
        .with(GetDocumentByUrl::new(Arc::clone(&service)))
        .with(SearchDocuments::new(service, hit_limit).max_keywords(max_keywords))
        .with(CurrentPageUrl::new(page))
}
