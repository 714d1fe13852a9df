//! `search_docs`: concurrent multi-keyword document search.
//!
//! Keywords are deduplicated, then one search per keyword is dispatched
//! concurrently and all of them are awaited. A failing keyword only affects
//! its own entry in the result map.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{RetrievalError, RetrievalOutcome};
use crate::agent::tool::Tool;
use crate::outline::{DocumentReference, DocumentService, SearchHit, SearchQuery};

/// Default number of keywords the model is asked to send.
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

/// Per-keyword outcome of a search.
pub type SearchOutcome = RetrievalOutcome<Vec<SearchHit>>;

/// Search outcomes keyed by (unique) keyword.
pub type KeywordResults = BTreeMap<String, SearchOutcome>;

/// Searches a single keyword, converting any failure into a scoped error.
async fn search_keyword(
    service: &dyn DocumentService,
    keyword: String,
    scope: &SearchQuery,
) -> (String, SearchOutcome) {
    let query = SearchQuery {
        query: keyword.clone(),
        ..scope.clone()
    };
    let outcome = match service.search_documents(&query).await {
        Ok(results) => {
            let hits: Vec<SearchHit> = results
                .data
                .into_iter()
                .take(scope.limit as usize)
                .map(SearchHit::from)
                .collect();
            debug!(keyword, hits = hits.len(), "keyword search complete");
            RetrievalOutcome::Found(hits)
        }
        Err(e) => {
            warn!(keyword, error = %e, "keyword search failed");
            RetrievalOutcome::Failed(RetrievalError::new(format!(
                "Error searching keyword '{keyword}': {e}"
            )))
        }
    };
    (keyword, outcome)
}

/// Runs one search per unique keyword concurrently and joins all of them.
///
/// The returned map has exactly one entry per distinct keyword, whatever
/// the individual searches returned. Dropping the future cancels the
/// searches still in flight.
pub async fn search_keywords<I>(
    service: &dyn DocumentService,
    keywords: I,
    hit_limit: u32,
) -> KeywordResults
where
    I: IntoIterator<Item = String>,
{
    search_keywords_in(service, keywords, &SearchQuery::new("").limit(hit_limit)).await
}

/// Like [`search_keywords`], but every search takes its offset, page size
/// and collection or document restriction from `scope`.
///
/// The query text of `scope` is ignored; `scope.limit` caps the hits kept
/// per keyword.
pub async fn search_keywords_in<I>(
    service: &dyn DocumentService,
    keywords: I,
    scope: &SearchQuery,
) -> KeywordResults
where
    I: IntoIterator<Item = String>,
{
    let unique: BTreeSet<String> = keywords.into_iter().collect();
    debug!(
        keywords = unique.len(),
        offset = scope.offset,
        collection = ?scope.collection_id,
        document = ?scope.document_id,
        "dispatching keyword searches"
    );

    join_all(
        unique
            .into_iter()
            .map(|keyword| search_keyword(service, keyword, scope)),
    )
    .await
    .into_iter()
    .collect()
}

/// Distinct documents matched by any keyword, in keyword then hit order.
#[must_use]
pub fn matched_documents(results: &KeywordResults) -> Vec<DocumentReference> {
    let mut seen = BTreeSet::new();
    results
        .values()
        .filter_map(|outcome| match outcome {
            RetrievalOutcome::Found(hits) => Some(hits),
            RetrievalOutcome::Failed(_) => None,
        })
        .flatten()
        .filter(|hit| seen.insert(hit.document_id.clone()))
        .map(SearchHit::document)
        .collect()
}

/// Renders keyword results as a markdown report, one section per keyword.
#[must_use]
pub fn search_report_markdown(results: &KeywordResults, base_url: &str) -> String {
    let mut out = String::new();
    for (keyword, outcome) in results {
        let _ = write!(out, "### Searching for keyword: {keyword}\n\n");
        match outcome {
            RetrievalOutcome::Found(hits) if hits.is_empty() => {
                out.push_str("No documents found.\n\n");
            }
            RetrievalOutcome::Found(hits) => {
                for hit in hits {
                    let _ = write!(
                        out,
                        "#### Found {}\n{}\n\n",
                        hit.document_id,
                        hit.to_markdown(base_url)
                    );
                }
            }
            RetrievalOutcome::Failed(err) => {
                let _ = write!(out, "{}\n\n", err.message);
            }
        }
    }
    out
}

/// Arguments of `search_docs`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchDocumentsInput {
    /// Up to 10 keywords: exact terms, synonyms, or paraphrases of the user's
    /// question. Give them in both Persian and English to maximise the chance
    /// of finding relevant documents.
    pub keywords: Vec<String>,
}

/// Tool that searches documents for several keywords at once.
pub struct SearchDocuments {
    service: Arc<dyn DocumentService>,
    hit_limit: u32,
    max_keywords: usize,
}

impl SearchDocuments {
    /// Creates the tool with the given per-keyword hit limit.
    pub fn new(service: Arc<dyn DocumentService>, hit_limit: u32) -> Self {
        Self {
            service,
            hit_limit,
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }

    /// Sets the keyword count advertised to the model.
    #[must_use]
    pub const fn max_keywords(mut self, n: usize) -> Self {
        self.max_keywords = n;
        self
    }
}

#[async_trait]
impl Tool for SearchDocuments {
    type Input = SearchDocumentsInput;
    type Output = KeywordResults;
    const NAME: &'static str = "search_docs";

    fn description(&self) -> String {
        format!(
            "Search documents with up to {} keywords. Each keyword is searched separately and \
             returns at most {} matching documents with the related text part. The result maps \
             every keyword to its matches, or to an error message if that search failed.",
            self.max_keywords, self.hit_limit
        )
    }

    async fn call(&self, input: SearchDocumentsInput) -> KeywordResults {
        if input.keywords.len() > self.max_keywords {
            warn!(
                requested = input.keywords.len(),
                max = self.max_keywords,
                "more keywords than advertised; searching all of them"
            );
        }
        search_keywords(self.service.as_ref(), input.keywords, self.hit_limit).await
    }
}
