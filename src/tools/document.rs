//! `get_doc_by_url`: fetch a full document by URL, path or ID.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::warn;

use super::{RetrievalError, RetrievalOutcome};
use crate::agent::tool::Tool;
use crate::outline::{Document, DocumentService};

/// Fetches a document, turning any failure into a [`RetrievalError`] that
/// names the requested URL and the cause.
pub async fn fetch_document(
    service: &dyn DocumentService,
    doc_url: &str,
) -> RetrievalOutcome<Document> {
    match service.fetch_document(doc_url).await {
        Ok(doc) => RetrievalOutcome::Found(doc),
        Err(e) => {
            let message = format!("Error fetching document by URL '{doc_url}': {e}");
            warn!(doc_url, error = %e, "document fetch failed");
            RetrievalOutcome::Failed(RetrievalError::new(message))
        }
    }
}

/// Arguments of `get_doc_by_url`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDocumentInput {
    /// The document to fetch: a full URL such as
    /// `https://docs.example.com/doc/onboarding-guide-6RwQmlbrCu`, or just the
    /// path `/doc/onboarding-guide-6RwQmlbrCu`.
    pub doc_url: String,
}

/// Tool that loads a full document.
pub struct GetDocumentByUrl {
    service: Arc<dyn DocumentService>,
}

impl GetDocumentByUrl {
    /// Creates the tool over a document service.
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetDocumentByUrl {
    type Input = GetDocumentInput;
    type Output = RetrievalOutcome<Document>;
    const NAME: &'static str = "get_doc_by_url";

    fn description(&self) -> String {
        "Fetch a full document (markdown text and timestamps) when you have its URL or path. \
         Returns the document, or an object with an error message if it cannot be loaded."
            .to_string()
    }

    async fn call(&self, input: GetDocumentInput) -> RetrievalOutcome<Document> {
        fetch_document(self.service.as_ref(), &input.doc_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tool::DynTool;
    use crate::tools::mock::MockDocumentService;

    #[tokio::test]
    async fn test_fetch_existing_document() {
        let service = MockDocumentService::new().with_document("q3-roadmap-abc", "Q3", "body");
        let outcome = fetch_document(&service, "https://docs.example.com/doc/q3-roadmap-abc").await;
        let doc = outcome.into_result().unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(doc.reference.title, "Q3");
    }

    #[tokio::test]
    async fn test_fetch_missing_document_returns_error_value() {
        let service = MockDocumentService::new();
        let outcome = fetch_document(&service, "/doc/nonexistent-id").await;
        let RetrievalOutcome::Failed(err) = outcome else {
            unreachable!("expected a retrieval error");
        };
        assert!(err.message.contains("/doc/nonexistent-id"));
        assert!(err.message.contains("404"));
    }

    #[tokio::test]
    async fn test_url_and_id_hit_same_request_id() {
        let service = MockDocumentService::new();
        let _ = fetch_document(&service, "https://docs.example.com/doc/title-XYZ").await;
        let _ = fetch_document(&service, "/doc/title-XYZ/").await;
        let _ = fetch_document(&service, "title-XYZ").await;
        let ids = service.fetched_ids.lock().map(|v| v.clone()).unwrap_or_default();
        assert_eq!(ids, vec!["title-XYZ", "title-XYZ", "title-XYZ"]);
    }

    #[tokio::test]
    async fn test_tool_output_for_model() {
        let tool = GetDocumentByUrl::new(Arc::new(MockDocumentService::new()));
        let out = tool
            .call_json(r#"{"doc_url":"/doc/missing"}"#)
            .await
            .unwrap_or_default();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert!(
            json["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("Error fetching document by URL '/doc/missing'"))
        );
    }

    #[test]
    fn test_definition_describes_argument() {
        let tool = GetDocumentByUrl::new(Arc::new(MockDocumentService::new()));
        let def = tool.definition();
        assert_eq!(def.name, "get_doc_by_url");
        assert!(def.parameters["properties"]["doc_url"]["description"].is_string());
    }
}
