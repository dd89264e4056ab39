use romeria::{
    submit_testimony, validate, MediaFile, MemoryBackend, PipelineConfig, PipelineContext,
    PipelineError, RawSubmission, StoreError, SubmissionConfig, ValidationFailure,
};

fn valid_submission() -> RawSubmission {
    RawSubmission {
        name: Some("Ana Ruiz".into()),
        trip: Some("Fatima (October 2024)".into()),
        testimony: Some(
            "We walked for a week, prayed at the shrine, and came home changed for good.".into(),
        ),
        language: Some("en".into()),
        consent: Some(true),
        ..Default::default()
    }
}

fn configured() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.store.owner = "romeria-travel".into();
    config.store.repo = "testimonies".into();
    config.store.token = Some("ghp_test".into());
    config
}

#[test]
fn missing_fields_report_localized_messages() {
    let err = validate(RawSubmission::default(), &SubmissionConfig::default()).unwrap_err();
    let errors = err.field_errors().expect("field failures carry a map");

    assert_eq!(errors.get("name").map(String::as_str), Some("Name is required"));
    assert!(errors.contains_key("trip"));
    assert!(errors.contains_key("testimony"));
    assert!(errors.contains_key("consent"));

    let spanish = RawSubmission {
        language: Some("es".into()),
        ..Default::default()
    };
    let err = validate(spanish, &SubmissionConfig::default()).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(
        errors.get("name").map(String::as_str),
        Some("El nombre es obligatorio")
    );
}

#[tokio::test]
async fn validation_failures_are_client_errors() {
    let ctx = PipelineContext::new(&configured(), MemoryBackend::new());
    let raw = RawSubmission {
        testimony: Some("Too short.".into()),
        ..valid_submission()
    };

    let err = submit_testimony(&ctx, raw).await.unwrap_err();
    assert!(err.is_client_error());
    assert!(ctx.backend().is_empty());
}

#[tokio::test]
async fn store_misconfiguration_is_a_server_side_failure() {
    // Default config has no owner or repo, so the write must refuse
    // before touching the backend.
    let ctx = PipelineContext::new(&PipelineConfig::default(), MemoryBackend::new());

    let err = submit_testimony(&ctx, valid_submission()).await.unwrap_err();
    assert!(!err.is_client_error());
    assert!(matches!(
        err,
        PipelineError::Store(StoreError::Config(_))
    ));
    assert!(ctx.backend().is_empty());
}

#[tokio::test]
async fn oversized_image_is_rejected_before_any_upload() {
    let mut config = configured();
    config.submission.max_image_bytes = 16;
    let ctx = PipelineContext::new(&config, MemoryBackend::new());

    let raw = RawSubmission {
        media: vec![MediaFile {
            data: "QUJDREVGRw==".repeat(10),
            mime_type: "image/jpeg".into(),
            name: Some("photo.jpg".into()),
            size: None,
        }],
        ..valid_submission()
    };

    let err = submit_testimony(&ctx, raw).await.unwrap_err();
    let PipelineError::Validation(ValidationFailure::Invalid { errors }) = err else {
        panic!("expected a field failure, got {err}");
    };
    assert!(errors["media[0]"].contains("Image too large"));
    assert!(ctx.backend().is_empty());
}

#[tokio::test]
async fn unsupported_mime_type_is_rejected() {
    let ctx = PipelineContext::new(&configured(), MemoryBackend::new());

    let raw = RawSubmission {
        media: vec![MediaFile {
            data: "QUJDREVGRw==".into(),
            mime_type: "application/pdf".into(),
            name: Some("flyer.pdf".into()),
            size: None,
        }],
        ..valid_submission()
    };

    let err = submit_testimony(&ctx, raw).await.unwrap_err();
    let PipelineError::Validation(ValidationFailure::Invalid { errors }) = err else {
        panic!("expected a field failure, got {err}");
    };
    assert!(errors["media[0]"].contains("Invalid file format"));
}

#[tokio::test]
async fn unknown_assignees_do_not_lose_the_testimony() {
    let mut config = configured();
    config.store.assignees = vec!["reviewer-bot".into()];

    let mut backend = MemoryBackend::new();
    backend.reject_assignees = true;
    let ctx = PipelineContext::new(&config, backend);

    let outcome = submit_testimony(&ctx, valid_submission()).await.unwrap();
    assert!(
        outcome.created,
        "the create must retry without assignees instead of failing"
    );
    assert_eq!(ctx.backend().len(), 1);
}
