//! Outline document service access.
//!
//! Wraps the Outline REST API behind the [`DocumentService`] trait so the
//! retrieval tools can run against any implementation.

pub mod client;
pub mod config;
pub mod types;

pub use client::{DocumentService, OutlineClient, SearchQuery, normalize_document_id};
pub use config::OutlineConfig;
pub use types::{
    Document, DocumentReference, RawSearchHit, SearchHit, SearchResults, documents_to_markdown,
};
