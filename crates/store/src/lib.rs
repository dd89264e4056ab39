//! Romeria document store client.
//!
//! Documents live in an external issue tracker. This crate is the only
//! code that talks to it: the write side creates labeled documents with
//! fingerprint idempotence, the read side lists open testimony documents
//! for the parser.
//!
//! ## Idempotence
//!
//! Before creating, we search open testimony documents for a body that
//! already contains the submission's fingerprint. A hit means a retry or a
//! double-click, and we hand back the existing document instead of writing
//! a duplicate. Two identical submissions racing each other can still both
//! create; the store is append-mostly and moderators resolve that case.
//!
//! ## Assignee fallback
//!
//! The store rejects payloads naming unknown assignees with a validation
//! error. Losing the reviewer assignment is not worth losing the
//! testimony, so the create retries once without assignees before giving
//! up.

mod backend;
mod config;
mod error;
mod http;
mod types;

use std::time::Instant;

use tracing::{debug, info, warn};

use document::EncodedDocument;

pub use crate::backend::{DocumentBackend, MemoryBackend};
pub use crate::config::{StoreConfig, StoreConfigError};
pub use crate::error::StoreError;
pub use crate::http::HttpBackend;
pub use crate::types::{DocumentPayload, Label, RawDocument, StoreOutcome};

/// Builds the payload a document would be created with.
///
/// Exposed so dry-run callers can inspect the would-be request.
pub fn payload_for(doc: &EncodedDocument, cfg: &StoreConfig) -> DocumentPayload {
    DocumentPayload {
        title: doc.title.clone(),
        body: doc.body.clone(),
        labels: doc.labels.clone(),
        assignees: cfg.assignees.clone(),
    }
}

/// Creates a document unless one with the same fingerprint already exists.
///
/// Returns the existing document with `created = false` on a fingerprint
/// hit. In dry-run mode no store call is made and a synthetic outcome is
/// returned. All other failures surface as [`StoreError`].
pub async fn create_if_absent<B: DocumentBackend>(
    doc: &EncodedDocument,
    cfg: &StoreConfig,
    backend: &B,
) -> Result<StoreOutcome, StoreError> {
    let start = Instant::now();

    if let Err(err) = cfg.validate_for_write() {
        warn!(error = %err, "store_create_failure");
        return Err(StoreError::Config(err.to_string()));
    }

    let payload = payload_for(doc, cfg);

    if cfg.dry_run {
        debug!(
            title = %payload.title,
            labels = ?payload.labels,
            assignees = ?payload.assignees,
            "store_dry_run_payload"
        );
        info!(
            fingerprint = %doc.fingerprint,
            elapsed_micros = start.elapsed().as_micros() as u64,
            "store_dry_run"
        );
        return Ok(StoreOutcome {
            id: 0,
            number: 0,
            url: format!("dry-run://testimony/{}", doc.fingerprint),
            created: false,
        });
    }

    match create_inner(doc, cfg, backend, payload).await {
        Ok(outcome) => {
            info!(
                fingerprint = %doc.fingerprint,
                document_number = outcome.number,
                created = outcome.created,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "store_create_success"
            );
            Ok(outcome)
        }
        Err(err) => {
            warn!(
                fingerprint = %doc.fingerprint,
                error = %err,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "store_create_failure"
            );
            Err(err)
        }
    }
}

async fn create_inner<B: DocumentBackend>(
    doc: &EncodedDocument,
    cfg: &StoreConfig,
    backend: &B,
    payload: DocumentPayload,
) -> Result<StoreOutcome, StoreError> {
    let existing = backend.list(&cfg.label).await?;
    if let Some(found) = existing
        .iter()
        .find(|d| d.body_text().contains(&doc.fingerprint))
    {
        info!(document_number = found.number, "duplicate_skipped");
        return Ok(StoreOutcome {
            id: found.id,
            number: found.number,
            url: found.html_url.clone(),
            created: false,
        });
    }

    let created = match backend.create(&payload).await {
        Ok(created) => created,
        Err(StoreError::Validation { detail }) if !payload.assignees.is_empty() => {
            warn!(error = %detail, "store_assignee_fallback");
            let reduced = DocumentPayload {
                assignees: Vec::new(),
                ..payload
            };
            backend.create(&reduced).await?
        }
        Err(err) => return Err(err),
    };

    info!(document_number = created.number, "document_created");
    Ok(StoreOutcome {
        id: created.id,
        number: created.number,
        url: created.html_url,
        created: true,
    })
}

/// Fetches open testimony documents, newest first.
///
/// A token is not required; anonymous reads are subject to the store's
/// rate limits only.
pub async fn fetch_documents<B: DocumentBackend>(
    cfg: &StoreConfig,
    backend: &B,
) -> Result<Vec<RawDocument>, StoreError> {
    let start = Instant::now();

    if let Err(err) = cfg.validate() {
        warn!(error = %err, "store_fetch_failure");
        return Err(StoreError::Config(err.to_string()));
    }

    match backend.list(&cfg.label).await {
        Ok(documents) => {
            info!(
                label = %cfg.label,
                document_count = documents.len(),
                elapsed_micros = start.elapsed().as_micros() as u64,
                "store_fetch_success"
            );
            Ok(documents)
        }
        Err(err) => {
            warn!(
                label = %cfg.label,
                error = %err,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "store_fetch_failure"
            );
            Err(err)
        }
    }
}
