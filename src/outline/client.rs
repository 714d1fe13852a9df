//! HTTP client for the Outline document API.
//!
//! Two operations are used: `documents.info` and `documents.search`. Both
//! are JSON `POST` calls authenticated with a bearer token.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::OutlineConfig;
use super::types::{Document, SearchResults};
use crate::error::{ConfigurationError, UpstreamError};

/// Default page size for `documents.search` when the caller sets none.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// Longest error body kept in [`UpstreamError::Status`].
const MAX_ERROR_BODY_LEN: usize = 500;

const DOCUMENTS_INFO: &str = "documents.info";
const DOCUMENTS_SEARCH: &str = "documents.search";

/// Parameters for a `documents.search` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Full-text query.
    pub query: String,
    /// Offset of the first hit.
    pub offset: u32,
    /// Page size.
    pub limit: u32,
    /// Restrict to one collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Restrict to one document (and its children).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl SearchQuery {
    /// Creates a query with offset 0 and the client default page size.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            offset: 0,
            limit: DEFAULT_SEARCH_LIMIT,
            collection_id: None,
            document_id: None,
        }
    }

    /// Sets the offset.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Restricts the search to a collection.
    #[must_use]
    pub fn collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    /// Restricts the search to a document.
    #[must_use]
    pub fn document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

/// Request body of `documents.search`: the query plus the fixed status filter.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    #[serde(flatten)]
    query: &'a SearchQuery,
    status_filter: [&'static str; 1],
}

#[derive(Serialize)]
struct InfoBody<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Access to documents stored in the document service.
///
/// Failures are returned as [`UpstreamError`]; callers that hand results to
/// the model convert them into retrieval errors.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Fetches a document by ID, path or full URL.
    async fn fetch_document(&self, id_or_url: &str) -> Result<Document, UpstreamError>;

    /// Searches published documents.
    async fn search_documents(&self, query: &SearchQuery) -> Result<SearchResults, UpstreamError>;
}

/// Extracts the canonical document ID from an ID, path or URL.
///
/// Surrounding whitespace and `/` separators are stripped and the trailing
/// path segment is returned, so `https://host/doc/title-ID`, `/doc/title-ID/`
/// and `title-ID` all map to `title-ID`.
#[must_use]
pub fn normalize_document_id(id_or_url: &str) -> &str {
    id_or_url
        .trim()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Outline REST client.
#[derive(Debug, Clone)]
pub struct OutlineClient {
    http: Client,
    base_url: String,
}

impl OutlineClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] if the API key cannot be used
    /// as a header value or the HTTP client cannot be built.
    pub fn new(config: &OutlineConfig) -> Result<Self, ConfigurationError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(
            |e| ConfigurationError::Invalid {
                setting: "Outline API token",
                message: e.to_string(),
            },
        )?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                setting: "HTTP client",
                message: e.to_string(),
            })?;

        debug!(base_url = %config.base_url, "created Outline client");

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Base URL documents are linked against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Posts a JSON body and decodes the JSON response.
    async fn post<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|source| {
                warn!(endpoint, error = %source, "request to Outline API failed");
                UpstreamError::Transport { endpoint, source }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY_LEN {
                let mut end = MAX_ERROR_BODY_LEN;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            warn!(endpoint, status = status.as_u16(), "Outline API returned an error status");
            return Err(UpstreamError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| UpstreamError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DocumentService for OutlineClient {
    async fn fetch_document(&self, id_or_url: &str) -> Result<Document, UpstreamError> {
        let id = normalize_document_id(id_or_url);
        debug!(id, "fetching document");
        let envelope: DataEnvelope<Document> =
            self.post(DOCUMENTS_INFO, &InfoBody { id }).await?;
        Ok(envelope.data)
    }

    async fn search_documents(&self, query: &SearchQuery) -> Result<SearchResults, UpstreamError> {
        debug!(query = %query.query, offset = query.offset, limit = query.limit, "searching documents");
        let body = SearchBody {
            query,
            status_filter: ["published"],
        };
        self.post(DOCUMENTS_SEARCH, &body).await
    }
}
