use std::sync::Arc;

use romeria::{
    submit_testimony, DisplayConfig, DisplayController, MemoryBackend, ParserConfig,
    PipelineConfig, PipelineContext, RawSubmission,
};

fn pipeline_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.store.owner = "romeria-travel".into();
    config.store.repo = "testimonies".into();
    config.store.token = Some("ghp_test".into());
    config
}

fn maria_gomez() -> RawSubmission {
    RawSubmission {
        name: Some("Maria Gomez".into()),
        trip: Some("Holy Land (Nov 2024)".into()),
        testimony: Some(
            "Walking where the Gospels happened changed how I pray. \
             Our guide made every site come alive for our whole group."
                .into(),
        ),
        email: Some("maria@example.com".into()),
        language: Some("en".into()),
        consent: Some(true),
        ..Default::default()
    }
}

fn shared_setup() -> (
    PipelineContext<Arc<MemoryBackend>>,
    DisplayController<Arc<MemoryBackend>>,
    Arc<MemoryBackend>,
) {
    let config = pipeline_config();
    let backend = Arc::new(MemoryBackend::new());
    let ctx = PipelineContext::new(&config, Arc::clone(&backend));
    let display = DisplayController::new(
        config.store.clone(),
        ParserConfig::default(),
        DisplayConfig::default(),
        Arc::clone(&backend),
    );
    (ctx, display, backend)
}

#[tokio::test]
async fn maria_gomez_submission_reaches_the_feed() {
    let (ctx, display, backend) = shared_setup();

    let outcome = submit_testimony(&ctx, maria_gomez())
        .await
        .expect("a valid submission must pass the whole pipeline");
    assert!(outcome.created);
    assert_eq!(outcome.document_number, 1);
    assert_eq!(backend.len(), 1);

    let records = display.load(false).await.unwrap();
    assert_eq!(records.len(), 1, "the stored document must parse back");

    let record = &records[0];
    assert_eq!(record.name, "Maria Gomez");
    assert_eq!(record.trip, "Holy Land (Nov 2024)");
    assert_eq!(record.destination, "Holy Land");
    assert_eq!(record.trip_date.as_deref(), Some("Nov 2024"));
    assert!(record.content.contains("Walking where the Gospels"));
    assert_eq!(record.url, outcome.document_url);
}

#[tokio::test]
async fn contact_email_never_reaches_the_feed() {
    let (ctx, display, _backend) = shared_setup();
    submit_testimony(&ctx, maria_gomez()).await.unwrap();

    let records = display.load(false).await.unwrap();
    let content = &records[0].content;

    assert!(
        !content.contains('@'),
        "the contact footer and bare addresses must be stripped, got: {content}"
    );
    assert!(!content.contains("fingerprint"));
    assert!(!content.contains("!["));
    assert!(!content.contains("**Submitted:**"));
}

#[tokio::test]
async fn resubmission_returns_the_original_document() {
    let (ctx, display, backend) = shared_setup();

    let first = submit_testimony(&ctx, maria_gomez()).await.unwrap();
    let second = submit_testimony(&ctx, maria_gomez()).await.unwrap();

    assert!(first.created);
    assert!(!second.created, "a fingerprint hit must not create again");
    assert_eq!(second.document_number, first.document_number);
    assert_eq!(second.document_url, first.document_url);
    assert_eq!(backend.len(), 1);

    let records = display.load(false).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn new_submissions_stay_in_the_review_queue() {
    let (ctx, display, _backend) = shared_setup();
    submit_testimony(&ctx, maria_gomez()).await.unwrap();
    display.load(false).await.unwrap();

    let public = display.verified_testimonials().unwrap();
    let review = display.testimonials_for_review().unwrap();

    assert!(
        public.is_empty(),
        "a fresh submission must not appear publicly before moderation"
    );
    assert_eq!(review.len(), 1);
    assert!(review[0].needs_review);
    assert!(!review[0].verified);
}

#[tokio::test]
async fn snapshot_hides_new_writes_until_refresh() {
    let (ctx, display, _backend) = shared_setup();

    submit_testimony(&ctx, maria_gomez()).await.unwrap();
    assert_eq!(display.load(false).await.unwrap().len(), 1);

    let late = RawSubmission {
        name: Some("Juan Perez".into()),
        trip: Some("Camino de Santiago (May 2025)".into()),
        testimony: Some(
            "Two weeks of walking taught me more about patience than any book ever did."
                .into(),
        ),
        ..maria_gomez()
    };
    submit_testimony(&ctx, late).await.unwrap();

    // Within the TTL the cached snapshot still answers.
    assert_eq!(display.load(false).await.unwrap().len(), 1);

    // A forced refresh sees both documents.
    assert_eq!(display.load(true).await.unwrap().len(), 2);
}
