//! Document and search data returned by the Outline API.
//!
//! Field names follow Outline's camelCase JSON so the same values can be
//! decoded from the API and handed to the model unchanged.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal identity of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    /// Outline document ID.
    pub id: String,
    /// Path of the document relative to the Outline base URL (e.g. `/doc/q3-roadmap-abc123`).
    pub url: String,
    /// Document title.
    pub title: String,
}

impl DocumentReference {
    /// Absolute link to the document.
    #[must_use]
    pub fn link(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.url)
    }
}

/// A document snapshot fetched from Outline.
///
/// Fetched fresh on every call; nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Identity (`id`, `url`, `title`).
    #[serde(flatten)]
    pub reference: DocumentReference,
    /// Document body in markdown.
    pub text: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Publication time; unset for drafts.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Archive time; unset unless archived.
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Renders the document as markdown for display.
    #[must_use]
    pub fn to_markdown(&self, base_url: &str) -> String {
        format!(
            "{} - [{}]({})\n\n{}\n",
            self.reference.id,
            self.reference.title,
            self.reference.link(base_url),
            self.text
        )
    }
}

/// One raw match from `documents.search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchHit {
    /// Matched document. Outline sends the full document; only the identity is kept.
    pub document: DocumentReference,
    /// Excerpt around the match, as supplied by the service.
    #[serde(default)]
    pub context: String,
}

/// Raw result set of `documents.search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches in service order.
    #[serde(default)]
    pub data: Vec<RawSearchHit>,
}

/// A single search match for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Matched document ID.
    pub document_id: String,
    /// Matched document path.
    pub document_url: String,
    /// Matched document title.
    pub document_title: String,
    /// The part of the document related to the keyword.
    pub related_text_part: String,
}

impl From<RawSearchHit> for SearchHit {
    fn from(raw: RawSearchHit) -> Self {
        Self {
            document_id: raw.document.id,
            document_url: raw.document.url,
            document_title: raw.document.title,
            related_text_part: raw.context,
        }
    }
}

impl SearchHit {
    /// Identity of the matched document.
    #[must_use]
    pub fn document(&self) -> DocumentReference {
        DocumentReference {
            id: self.document_id.clone(),
            url: self.document_url.clone(),
            title: self.document_title.clone(),
        }
    }

    /// Renders the hit as markdown for display.
    #[must_use]
    pub fn to_markdown(&self, base_url: &str) -> String {
        format!(
            "[{}]({base_url}{})\n\n{}\n",
            self.document_title, self.document_url, self.related_text_part
        )
    }
}

/// Renders a list of documents as a markdown bullet list.
#[must_use]
pub fn documents_to_markdown(documents: &[DocumentReference], base_url: &str) -> String {
    let mut out = String::new();
    for doc in documents {
        let _ = writeln!(out, "- [{}]({})", doc.title, doc.link(base_url));
    }
    out
}
