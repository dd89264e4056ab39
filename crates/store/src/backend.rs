//! Storage backends for the document store client.
//!
//! The trait abstracts the two operations the pipeline needs, so the
//! idempotence and fallback logic in [`crate::create_if_absent`] can be
//! tested against [`MemoryBackend`] without a network.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use crate::error::StoreError;
use crate::types::{DocumentPayload, Label, RawDocument};

/// Trait for a document store backend.
///
/// Implementations: the HTTP client in [`crate::HttpBackend`] and an
/// in-memory store for tests.
pub trait DocumentBackend: Send + Sync {
    /// Create a document and return it as the store recorded it.
    fn create(
        &self,
        payload: &DocumentPayload,
    ) -> impl Future<Output = Result<RawDocument, StoreError>> + Send;

    /// List open documents carrying the given label, newest first.
    fn list(&self, label: &str) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send;
}

/// A shared backend is a backend. Lets one store instance serve both
/// the write pipeline and a read-side consumer.
impl<B: DocumentBackend> DocumentBackend for std::sync::Arc<B> {
    fn create(
        &self,
        payload: &DocumentPayload,
    ) -> impl Future<Output = Result<RawDocument, StoreError>> + Send {
        (**self).create(payload)
    }

    fn list(&self, label: &str) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send {
        (**self).list(label)
    }
}

/// An in-memory backend using a `RwLock` around a `Vec`.
pub struct MemoryBackend {
    pub(crate) documents: RwLock<Vec<RawDocument>>,
    pub(crate) next_number: AtomicU64,
    /// When true, creates that carry assignees are rejected with a
    /// validation error, mimicking a store that does not know them.
    pub reject_assignees: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            next_number: AtomicU64::new(1),
            reject_assignees: false,
        }
    }

    /// Starts the backend pre-populated with existing documents.
    pub fn with_documents(documents: Vec<RawDocument>) -> Self {
        let next = documents.iter().map(|d| d.number).max().unwrap_or(0) + 1;
        Self {
            documents: RwLock::new(documents),
            next_number: AtomicU64::new(next),
            reject_assignees: false,
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend for MemoryBackend {
    async fn create(&self, payload: &DocumentPayload) -> Result<RawDocument, StoreError> {
        if self.reject_assignees && !payload.assignees.is_empty() {
            return Err(StoreError::Validation {
                detail: "Validation Failed: assignees do not exist".to_string(),
            });
        }

        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let document = RawDocument {
            id: 1000 + number,
            number,
            title: payload.title.clone(),
            body: Some(payload.body.clone()),
            labels: payload
                .labels
                .iter()
                .map(|name| Label { name: name.clone() })
                .collect(),
            html_url: format!("https://documents.example/testimonies/{number}"),
            created_at: Utc::now(),
        };

        self.documents
            .write()
            .map_err(|_| StoreError::Transport("poisoned lock".to_string()))?
            .push(document.clone());
        Ok(document)
    }

    async fn list(&self, label: &str) -> Result<Vec<RawDocument>, StoreError> {
        let guard = self
            .documents
            .read()
            .map_err(|_| StoreError::Transport("poisoned lock".to_string()))?;
        let mut matching: Vec<RawDocument> = guard
            .iter()
            .filter(|d| d.has_label(label))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
