//! In-memory document service for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::UpstreamError;
use crate::outline::{
    Document, DocumentReference, DocumentService, RawSearchHit, SearchQuery, SearchResults,
    normalize_document_id,
};

/// Document service backed by maps; records every request it receives.
#[derive(Default)]
pub struct MockDocumentService {
    documents: HashMap<String, Document>,
    hits: HashMap<String, Vec<RawSearchHit>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    pub fetched_ids: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<SearchQuery>>,
    completed: AtomicUsize,
}

impl MockDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, id: &str, title: &str, text: &str) -> Self {
        self.documents.insert(id.to_string(), document(id, title, text));
        self
    }

    pub fn with_hits(mut self, keyword: &str, count: usize) -> Self {
        let hits = (0..count)
            .map(|i| RawSearchHit {
                document: DocumentReference {
                    id: format!("{keyword}-{i}"),
                    url: format!("/doc/{keyword}-{i}"),
                    title: format!("{keyword} #{i}"),
                },
                context: format!("context for {keyword} {i}"),
            })
            .collect();
        self.hits.insert(keyword.to_string(), hits);
        self
    }

    pub fn failing(mut self, keyword: &str) -> Self {
        self.failing.insert(keyword.to_string());
        self
    }

    pub fn with_delay(mut self, keyword: &str, delay: Duration) -> Self {
        self.delays.insert(keyword.to_string(), delay);
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().map_or(0, |s| s.len())
    }

    /// Searches that ran to the end, delay included.
    pub fn completed_searches(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

pub fn document(id: &str, title: &str, text: &str) -> Document {
    Document {
        reference: DocumentReference {
            id: id.to_string(),
            url: format!("/doc/{id}"),
            title: title.to_string(),
        },
        text: text.to_string(),
        created_at: Utc
            .with_ymd_and_hms(2024, 7, 1, 9, 30, 0)
            .single()
            .unwrap_or_default(),
        updated_at: None,
        published_at: None,
        archived_at: None,
    }
}

#[async_trait]
impl DocumentService for MockDocumentService {
    async fn fetch_document(&self, id_or_url: &str) -> Result<Document, UpstreamError> {
        let id = normalize_document_id(id_or_url);
        if let Ok(mut ids) = self.fetched_ids.lock() {
            ids.push(id.to_string());
        }
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                endpoint: "documents.info",
                status: 404,
                body: r#"{"ok":false,"error":"not_found"}"#.to_string(),
            })
    }

    async fn search_documents(&self, query: &SearchQuery) -> Result<SearchResults, UpstreamError> {
        if let Ok(mut searches) = self.searches.lock() {
            searches.push(query.clone());
        }
        if let Some(delay) = self.delays.get(&query.query) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&query.query) {
            return Err(UpstreamError::Status {
                endpoint: "documents.search",
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(SearchResults {
            data: self.hits.get(&query.query).cloned().unwrap_or_default(),
        })
    }
}
