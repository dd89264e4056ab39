use std::sync::Arc;

use romeria::{
    submit_testimony, DisplayConfig, DisplayController, Language, MemoryBackend, ParserConfig,
    PipelineConfig, PipelineContext, PipelineError, RawSubmission, ValidationFailure,
};

fn pipeline_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.store.owner = "romeria-travel".into();
    config.store.repo = "testimonies".into();
    config.store.token = Some("ghp_test".into());
    config
}

fn memory_context() -> PipelineContext<MemoryBackend> {
    PipelineContext::new(&pipeline_config(), MemoryBackend::new())
}

fn submission_with_narrative(narrative: String) -> RawSubmission {
    RawSubmission {
        name: Some("Ana Ruiz".into()),
        trip: Some("Fatima (October 2024)".into()),
        testimony: Some(narrative),
        language: Some("en".into()),
        consent: Some(true),
        ..Default::default()
    }
}

#[tokio::test]
async fn narrative_bounds_follow_the_form_contract() {
    let ctx = memory_context();

    for (length, accepted) in [(49, false), (50, true), (2000, true), (2001, false)] {
        let raw = submission_with_narrative("x".repeat(length));
        let result = submit_testimony(&ctx, raw).await;
        assert_eq!(
            result.is_ok(),
            accepted,
            "a {length}-character narrative should be accepted={accepted}"
        );
        if !accepted {
            let err = result.unwrap_err();
            assert!(matches!(
                err,
                PipelineError::Validation(ValidationFailure::Invalid { .. })
            ));
        }
    }

    // Only the two in-bounds narratives made it to the store.
    assert_eq!(ctx.backend().len(), 2);
}

#[tokio::test]
async fn spanish_alias_payload_round_trips() {
    let raw: RawSubmission = serde_json::from_str(
        r#"{
            "nombre": "María del Pilar",
            "viaje": "Camino de Santiago (Mayo 2025)",
            "testimonio": "Caminamos dos semanas por el norte y cada día nos trajo una gracia nueva para toda la familia.",
            "correo": "pilar@example.com",
            "idioma": "es",
            "consent": true
        }"#,
    )
    .unwrap();

    let config = pipeline_config();
    let backend = Arc::new(MemoryBackend::new());
    let ctx = PipelineContext::new(&config, Arc::clone(&backend));
    let display = DisplayController::new(
        config.store.clone(),
        ParserConfig::default(),
        DisplayConfig::default(),
        Arc::clone(&backend),
    );

    let outcome = submit_testimony(&ctx, raw).await.unwrap();
    assert!(outcome.created);

    let records = display.load(false).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "María del Pilar");
    assert_eq!(records[0].language, Language::Es);
    assert_eq!(records[0].destination, "Camino de Santiago");
    assert_eq!(records[0].trip_date.as_deref(), Some("May 2025"));
    assert!(!records[0].content.contains('@'));
}

#[tokio::test]
async fn honeypot_hit_never_reaches_the_feed() {
    let config = pipeline_config();
    let backend = Arc::new(MemoryBackend::new());
    let ctx = PipelineContext::new(&config, Arc::clone(&backend));
    let display = DisplayController::new(
        config.store.clone(),
        ParserConfig::default(),
        DisplayConfig::default(),
        Arc::clone(&backend),
    );

    let raw = RawSubmission {
        honeypot: Some("http://spam.example".into()),
        ..submission_with_narrative("x".repeat(120))
    };

    let outcome = submit_testimony(&ctx, raw).await.unwrap();
    assert!(outcome.honeypot_discarded);
    assert!(backend.is_empty());
    assert!(display.load(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn feed_filters_and_pages_over_submitted_documents() {
    let config = pipeline_config();
    let backend = Arc::new(MemoryBackend::new());
    let ctx = PipelineContext::new(&config, Arc::clone(&backend));
    let display = DisplayController::new(
        config.store.clone(),
        ParserConfig::default(),
        DisplayConfig::default(),
        Arc::clone(&backend),
    );

    for n in 1..=12 {
        let raw = RawSubmission {
            name: Some(format!("Pilgrim {n}")),
            trip: Some(format!("Lourdes (June 2025) group {n}")),
            testimony: Some(format!(
                "Day {n} of our walk brought quiet processions and a peace none of us expected."
            )),
            language: Some("en".into()),
            consent: Some(true),
            ..Default::default()
        };
        let outcome = submit_testimony(&ctx, raw).await.unwrap();
        assert!(outcome.created, "submission {n} should be new");
    }

    display.load(false).await.unwrap();
    let matched = display.apply_filters(Some("Lourdes"), None).unwrap();
    assert_eq!(matched, 12);

    assert_eq!(display.visible().unwrap().len(), 9);
    let info = display.page_info().unwrap();
    assert_eq!(info.page, 1);
    assert_eq!(info.total_records, 12);
    assert!(info.has_more);

    assert!(display.load_more().unwrap());
    assert_eq!(display.visible().unwrap().len(), 12);
    assert!(!display.page_info().unwrap().has_more);

    let narrowed = display.apply_filters(None, Some("pilgrim 7")).unwrap();
    assert_eq!(narrowed, 1);
    assert_eq!(display.visible().unwrap()[0].name, "Pilgrim 7");
}
