use std::sync::Arc;
use std::time::{Duration, Instant};
use thrive_inquiry::infrastructure::mocks::{
    MemorySheetBackend, MockCaptureLayer, MockClock, RecordingStore,
};
use thrive_inquiry::{
    CircuitBreakerConfig, InquiryForm, InquiryInput, Metrics, Outcome, SessionId, SiteConfig,
    SpreadsheetStore, SubmissionOrchestrator, FALLBACK_TARGET, THROTTLED_NOTICE,
};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

fn jane() -> InquiryInput {
    InquiryInput::from(InquiryForm {
        name: "Jane".to_string(),
        email: "jane@x.com".to_string(),
        goals: "get fit".to_string(),
        ..InquiryForm::default()
    })
}

fn configured() -> SiteConfig {
    SiteConfig {
        credentials_json: Some(r#"{"client_email": "svc@example.iam"}"#.to_string()),
        ..SiteConfig::default()
    }
}

#[test]
fn test_accepted_then_throttled() {
    let clock = Arc::new(MockClock::new(Instant::now()));
    let backend = MemorySheetBackend::new();
    let metrics = Metrics::new();
    let store = SpreadsheetStore::with_parts(
        &configured(),
        backend.clone(),
        metrics.clone(),
        CircuitBreakerConfig::default(),
        clock.clone(),
    );
    let pipeline = SubmissionOrchestrator::builder()
        .with_clock(clock.clone())
        .with_metrics(metrics.clone())
        .with_store(Arc::new(store))
        .build()
        .unwrap();
    let session = SessionId::new("visitor-1");

    assert_eq!(pipeline.submit(jane(), &session), Outcome::Accepted);
    assert_eq!(backend.rows().len(), 2);

    clock.advance(Duration::from_secs(2));
    let outcome = pipeline.submit(jane(), &session);
    assert_eq!(
        outcome,
        Outcome::Throttled {
            retry_after: Duration::from_secs(4)
        }
    );
    assert_eq!(outcome.notice(), THROTTLED_NOTICE);
    assert_eq!(backend.rows().len(), 2);

    clock.advance(Duration::from_secs(4));
    assert_eq!(pipeline.submit(jane(), &session), Outcome::Accepted);
    assert_eq!(backend.rows().len(), 3);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.accepted, 2);
    assert_eq!(snapshot.throttled, 1);
    assert_eq!(snapshot.fallback_total(), 0);
}

#[test]
fn test_honeypot_rejected_without_store_call() {
    let store = RecordingStore::new();
    let pipeline = SubmissionOrchestrator::builder()
        .with_store(Arc::new(store.clone()))
        .build()
        .unwrap();

    let input = InquiryInput::from(InquiryForm {
        name: "Bot".to_string(),
        email: "bot@x.com".to_string(),
        honeypot: "spam".to_string(),
        ..InquiryForm::default()
    });
    let outcome = pipeline.submit(input, &SessionId::new("visitor-1"));

    assert_eq!(outcome, Outcome::Rejected("spam".to_string()));
    assert_eq!(store.calls(), 0);
}

#[test]
fn test_missing_credentials_accepted_and_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let metrics = Metrics::new();
    let pipeline = SubmissionOrchestrator::builder()
        .with_config(SiteConfig::default())
        .with_metrics(metrics.clone())
        .build()
        .unwrap();

    let outcome = tracing::subscriber::with_default(subscriber, || {
        pipeline.submit(jane(), &SessionId::new("visitor-1"))
    });

    assert_eq!(outcome, Outcome::Accepted);
    let records = capture.events_for(FALLBACK_TARGET);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::ERROR);
    assert_eq!(records[0].field("name"), Some("Jane"));
    assert_eq!(records[0].field("email"), Some("jane@x.com"));
    assert_eq!(records[0].field("goals"), Some("get fit"));
    assert_eq!(metrics.fallback_configuration(), 1);
}

#[test]
fn test_trimmed_fields_reach_the_sheet() {
    let backend = MemorySheetBackend::new();
    let pipeline = SubmissionOrchestrator::builder()
        .with_store(Arc::new(SpreadsheetStore::new(&configured(), backend.clone())))
        .build()
        .unwrap();

    let input = InquiryInput::from(InquiryForm {
        name: "  Jane  ".to_string(),
        email: " jane@x.com\n".to_string(),
        phone: " 555-0100 ".to_string(),
        ..InquiryForm::default()
    });
    assert!(pipeline.submit(input, &SessionId::new("visitor-1")).is_accepted());

    let rows = backend.rows();
    assert_eq!(rows[1][1], "Jane");
    assert_eq!(rows[1][2], "jane@x.com");
    assert_eq!(rows[1][3], "555-0100");
}

#[test]
fn test_sessions_throttled_independently() {
    let store = RecordingStore::new();
    let pipeline = SubmissionOrchestrator::builder()
        .with_clock(Arc::new(MockClock::new(Instant::now())))
        .with_store(Arc::new(store.clone()))
        .build()
        .unwrap();

    for i in 0..5 {
        let session = SessionId::new(format!("visitor-{i}"));
        assert!(pipeline.submit(jane(), &session).is_accepted());
        assert!(!pipeline.submit(jane(), &session).is_accepted());
    }
    assert_eq!(store.calls(), 5);
    assert_eq!(pipeline.limiter().registry().len(), 5);
}

#[test]
fn test_concurrent_submissions_one_session() {
    use std::thread;

    let store = RecordingStore::new();
    let pipeline = Arc::new(
        SubmissionOrchestrator::builder()
            .with_clock(Arc::new(MockClock::new(Instant::now())))
            .with_store(Arc::new(store.clone()))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.submit(jane(), &SessionId::new("shared")))
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(Outcome::is_accepted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(store.calls(), 1);
}
