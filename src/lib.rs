//! Workspace umbrella crate for the Romeria testimony pipeline.
//!
//! This crate stitches the submit flow together so callers run
//! validate, upload, encode, and store through a single entry point.
//! The read side (fetch, parse, display) lives in the stage crates and
//! is re-exported here for convenience.

pub mod config;

pub use crate::config::{ConfigLoadError, PipelineConfig};
pub use display::{DisplayConfig, DisplayController, DisplayError, PageInfo, Phase};
pub use document::{encode, fingerprint, EncodedDocument};
pub use media::{
    upload, upload_all, FailedUpload, MediaConfig, UploadError, UploadReport, UploadedMedia,
};
pub use parser::{parse_all, ParserConfig, TestimonialRecord};
pub use store::{
    create_if_absent, fetch_documents, DocumentBackend, HttpBackend, MemoryBackend, StoreConfig,
    StoreError, StoreOutcome,
};
pub use submission::{
    validate, Language, MediaFile, MediaKind, RawSubmission, Submission, SubmissionConfig,
    ValidationFailure,
};

use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while pushing a submission through the pipeline.
///
/// Honeypot rejections are not errors; they surface as a
/// [`SubmissionOutcome`] with `honeypot_discarded` set so the caller can
/// answer with a generic success.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The submission failed field validation.
    #[error("submission rejected: {0}")]
    Validation(#[from] ValidationFailure),

    /// A media upload failed in abort mode.
    #[error("media upload failed: {0}")]
    Upload(#[from] UploadError),

    /// The document store write or duplicate lookup failed.
    #[error("document store failure: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// True when the submitter caused the failure and can fix it.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// What a submission produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    /// Public URL of the stored document. Empty for discarded spam.
    pub document_url: String,
    /// Store-assigned document number. Zero for discarded spam and
    /// dry-run outcomes.
    pub document_number: u64,
    /// Hosted URLs of the uploaded media, in submission order.
    pub media_urls: Vec<String>,
    /// Present when some media failed to upload in continue mode.
    pub image_warning: Option<String>,
    /// True when this call created the document, false for a
    /// fingerprint duplicate.
    pub created: bool,
    /// True when the spam trap fired and nothing was written.
    pub honeypot_discarded: bool,
}

impl SubmissionOutcome {
    fn discarded() -> Self {
        SubmissionOutcome {
            document_url: String::new(),
            document_number: 0,
            media_urls: Vec::new(),
            image_warning: None,
            created: false,
            honeypot_discarded: true,
        }
    }
}

/// Everything the submit flow needs, owned in one place.
///
/// The backend decides where documents land: [`HttpBackend`] for the
/// real store, [`MemoryBackend`] for tests and local runs.
pub struct PipelineContext<B: DocumentBackend> {
    pub submission: SubmissionConfig,
    pub media: MediaConfig,
    pub store: StoreConfig,
    backend: B,
}

impl<B: DocumentBackend> PipelineContext<B> {
    /// Builds a context from a loaded pipeline configuration.
    pub fn new(config: &PipelineConfig, backend: B) -> Self {
        PipelineContext {
            submission: config.submission.clone(),
            media: config.media.clone(),
            store: config.store.clone(),
            backend,
        }
    }

    /// The document backend this context writes through.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Stage observer for the submit flow.
///
/// Installed globally so the server can count stage outcomes without
/// threading a handle through every call.
pub trait PipelineObserver: Send + Sync {
    fn record_validation(&self, latency: Duration, result: Result<(), &ValidationFailure>);
    fn record_upload(&self, latency: Duration, result: Result<(), &UploadError>);
    fn record_store(&self, latency: Duration, result: Result<(), &StoreError>);
}

/// Install or clear the global pipeline observer.
pub fn set_pipeline_observer(observer: Option<Arc<dyn PipelineObserver>>) {
    let lock = observer_lock();
    let mut guard = lock.write().expect("pipeline observer lock poisoned");
    *guard = observer;
}

fn observer_lock() -> &'static RwLock<Option<Arc<dyn PipelineObserver>>> {
    static OBSERVER: OnceLock<RwLock<Option<Arc<dyn PipelineObserver>>>> = OnceLock::new();
    OBSERVER.get_or_init(|| RwLock::new(None))
}

fn current_observer() -> Option<Arc<dyn PipelineObserver>> {
    let guard = observer_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct ObserverSpan {
    observer: Arc<dyn PipelineObserver>,
    start: Instant,
}

impl ObserverSpan {
    fn start() -> Option<Self> {
        current_observer().map(|observer| Self {
            observer,
            start: Instant::now(),
        })
    }

    fn record_validation(self, result: Result<(), &ValidationFailure>) {
        self.observer.record_validation(self.start.elapsed(), result);
    }

    fn record_upload(self, result: Result<(), &UploadError>) {
        self.observer.record_upload(self.start.elapsed(), result);
    }

    fn record_store(self, result: Result<(), &StoreError>) {
        self.observer.record_store(self.start.elapsed(), result);
    }
}

/// Runs a raw form submission through the whole pipeline.
///
/// validate, then upload each attachment in order, then encode, then
/// create the document unless its fingerprint already exists. A filled
/// spam trap short-circuits to a discarded outcome with nothing written
/// anywhere.
pub async fn submit_testimony<B: DocumentBackend>(
    ctx: &PipelineContext<B>,
    raw: RawSubmission,
) -> Result<SubmissionOutcome, PipelineError> {
    let start = Instant::now();

    let mut observation = ObserverSpan::start();
    let submission = match validate(raw, &ctx.submission) {
        Ok(submission) => {
            if let Some(span) = observation.take() {
                span.record_validation(Ok(()));
            }
            submission
        }
        Err(ValidationFailure::Honeypot) => {
            if let Some(span) = observation.take() {
                span.record_validation(Err(&ValidationFailure::Honeypot));
            }
            info!(
                elapsed_micros = start.elapsed().as_micros() as u64,
                "testimony_discarded"
            );
            return Ok(SubmissionOutcome::discarded());
        }
        Err(err) => {
            if let Some(span) = observation.take() {
                span.record_validation(Err(&err));
            }
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "testimony_submit_failure"
            );
            return Err(PipelineError::Validation(err));
        }
    };

    let mut observation = ObserverSpan::start();
    let report = match upload_all(&submission.media, &ctx.media).await {
        Ok(report) => {
            if let Some(span) = observation.take() {
                span.record_upload(Ok(()));
            }
            report
        }
        Err(err) => {
            if let Some(span) = observation.take() {
                span.record_upload(Err(&err));
            }
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "testimony_submit_failure"
            );
            return Err(PipelineError::Upload(err));
        }
    };
    let image_warning = if report.all_succeeded() {
        None
    } else {
        Some("Image upload failed, but your testimony was saved successfully".to_string())
    };

    let document = encode(&submission, &report.uploaded);

    let mut observation = ObserverSpan::start();
    let stored = match create_if_absent(&document, &ctx.store, ctx.backend()).await {
        Ok(outcome) => {
            if let Some(span) = observation.take() {
                span.record_store(Ok(()));
            }
            outcome
        }
        Err(err) => {
            if let Some(span) = observation.take() {
                span.record_store(Err(&err));
            }
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "testimony_submit_failure"
            );
            return Err(PipelineError::Store(err));
        }
    };

    info!(
        document_number = stored.number,
        created = stored.created,
        media_count = report.uploaded.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "testimony_submitted"
    );

    Ok(SubmissionOutcome {
        document_url: stored.url,
        document_number: stored.number,
        media_urls: report.uploaded.iter().map(|m| m.url.clone()).collect(),
        image_warning,
        created: stored.created,
        honeypot_discarded: false,
    })
}
