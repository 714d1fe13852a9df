//! Shared fixtures: a mock Outline API and a scripted model provider.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use outline_assistant::agent::{ChatRequest, ChunkStream, LlmProvider, StreamChunk};
use outline_assistant::error::AgentError;
use outline_assistant::outline::{OutlineClient, OutlineConfig};

pub const API_TOKEN: &str = "ol_api_test_token";

/// A request received by the mock API.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub endpoint: &'static str,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Contents served by the mock API.
#[derive(Debug, Default)]
pub struct OutlineFixture {
    documents: HashMap<String, Value>,
    hits: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<Recorded>>,
}

pub fn document_json(id: &str, title: &str, text: &str) -> Value {
    json!({
        "id": id,
        "url": format!("/doc/{id}"),
        "title": title,
        "text": text,
        "createdAt": "2025-06-01T09:00:00.000Z",
        "updatedAt": "2025-06-10T12:30:00.000Z",
        "publishedAt": "2025-06-02T08:00:00.000Z",
        "archivedAt": null,
        "collectionId": "col-1",
        "revision": 7
    })
}

impl OutlineFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, id: &str, title: &str, text: &str) -> Self {
        self.documents
            .insert(id.to_string(), document_json(id, title, text));
        self
    }

    pub fn hits(mut self, keyword: &str, ids: &[&str]) -> Self {
        let hits = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                json!({
                    "ranking": 1.0 - (i as f64) / 10.0,
                    "context": format!("…{keyword} appears in {id}…"),
                    "document": document_json(id, &format!("Title of {id}"), "full text"),
                })
            })
            .collect();
        self.hits.insert(keyword.to_string(), hits);
        self
    }

    pub fn failing(mut self, keyword: &str) -> Self {
        self.failing.insert(keyword.to_string());
        self
    }

    fn record(&self, endpoint: &'static str, headers: &HeaderMap, body: &Value) {
        self.requests.lock().unwrap().push(Recorded {
            endpoint,
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.clone(),
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {API_TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"ok": false, "error": "authentication_required"})),
    )
}

async fn documents_info(
    State(fixture): State<Arc<OutlineFixture>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fixture.record("documents.info", &headers, &body);
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = body["id"].as_str().unwrap_or_default();
    match fixture.documents.get(id) {
        Some(doc) => (StatusCode::OK, Json(json!({"data": doc}))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"ok": false, "error": "not_found", "message": "Resource not found"})),
        ),
    }
}

async fn documents_search(
    State(fixture): State<Arc<OutlineFixture>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fixture.record("documents.search", &headers, &body);
    if !authorized(&headers) {
        return unauthorized();
    }
    let query = body["query"].as_str().unwrap_or_default();
    if fixture.failing.contains(query) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": "internal_error"})),
        );
    }
    let data = fixture.hits.get(query).cloned().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "data": data,
            "pagination": {"offset": body["offset"], "limit": body["limit"]}
        })),
    )
}

/// A running mock Outline API.
pub struct MockOutline {
    pub base_url: String,
    pub fixture: Arc<OutlineFixture>,
}

impl MockOutline {
    pub async fn start(fixture: OutlineFixture) -> Self {
        let fixture = Arc::new(fixture);
        let app = Router::new()
            .route("/api/documents.info", post(documents_info))
            .route("/api/documents.search", post(documents_search))
            .with_state(Arc::clone(&fixture));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            fixture,
        }
    }

    pub fn config(&self) -> OutlineConfig {
        OutlineConfig::builder()
            .base_url(format!("{}/", self.base_url))
            .api_key(API_TOKEN)
            .build()
            .unwrap()
    }

    pub fn client(&self) -> OutlineClient {
        OutlineClient::new(&self.config()).unwrap()
    }
}

/// Provider replaying canned streamed responses, one per model round.
///
/// Behaves like the crate's own unit-test provider: rounds hold chunk
/// results so a stream can fail midway, and an exhausted script fails the
/// request with "script exhausted".
#[derive(Default)]
pub struct ScriptedProvider {
    rounds: Mutex<VecDeque<Vec<Result<StreamChunk, AgentError>>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a round streaming `parts` as text chunks.
    pub fn text(self, parts: &[&str]) -> Self {
        self.round(parts.iter().map(|p| Ok(StreamChunk::text(*p))).collect())
    }

    /// Adds a round requesting one tool call.
    pub fn tool_call(self, id: &str, name: &str, arguments: &str) -> Self {
        self.round(vec![Ok(StreamChunk::tool_call(0, id, name, arguments))])
    }

    pub fn round(self, chunks: Vec<Result<StreamChunk, AgentError>>) -> Self {
        self.rounds.lock().unwrap().push_back(chunks);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, AgentError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.rounds.lock().unwrap().pop_front();
        next.map(|chunks| Box::pin(futures_util::stream::iter(chunks)) as ChunkStream)
            .ok_or_else(|| AgentError::ApiRequest {
                message: "script exhausted".to_string(),
                status: None,
            })
    }
}
