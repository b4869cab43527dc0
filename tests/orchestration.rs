//! End-to-end orchestration tests against a scripted in-process engine.
//!
//! These exercise the full flow surface (decode → shape → invoke → retry →
//! reconcile / fan-out) with no network. The engine is a mock that either
//! replays a fixed script of responses or answers per-item by article id.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use doc2struct::{
    analyze_backlog, analyze_news, extract_clauses, news_stream, score_articles, summarize,
    Article, BacklogItem, DocumentReference, EngineError, EngineErrorKind, ExtractConfig,
    ExtractError, InferenceEngine, NewsCorpus, PromptTemplate, RetryPolicy, Sentiment,
};
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio_stream::StreamExt;

/// Engine that replays a fixed script of responses, recording every call.
struct ScriptedEngine {
    script: Mutex<VecDeque<Result<Option<Value>, EngineError>>>,
    calls: Mutex<Vec<(&'static str, Value)>>,
}

impl ScriptedEngine {
    fn new(script: Vec<Result<Option<Value>, EngineError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn recorded_calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceEngine for ScriptedEngine {
    async fn generate(
        &self,
        template: PromptTemplate,
        payload: &Value,
        _output_schema: &Value,
    ) -> Result<Option<Value>, EngineError> {
        self.calls.lock().unwrap().push((template.id(), payload.clone()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("engine called more times than scripted"))
    }
}

/// Engine for fan-out tests: answers by article id, so the response does not
/// depend on completion order. Ids in `failing` get a terminal error.
struct PerArticleEngine {
    failing: HashSet<String>,
}

impl PerArticleEngine {
    fn new(failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl InferenceEngine for PerArticleEngine {
    async fn generate(
        &self,
        _template: PromptTemplate,
        payload: &Value,
        _output_schema: &Value,
    ) -> Result<Option<Value>, EngineError> {
        let id = payload["article"]["id"]
            .as_str()
            .unwrap_or_else(|| panic!("payload missing article id: {payload}"));
        if self.failing.contains(id) {
            return Err(EngineError::new(
                EngineErrorKind::InvalidRequest,
                format!("scripted failure for {id}"),
            ));
        }
        // Relevance tracks the simulated corpus: the last article is off-topic.
        let relevant = id != "n-005";
        Ok(Some(json!({
            "id": id,
            "relevant": relevant,
            "sentiment": "positive",
            "rationale": format!("scripted signal for {id}"),
        })))
    }
}

fn config_with(engine: Arc<dyn InferenceEngine>) -> ExtractConfig {
    ExtractConfig::builder()
        .engine(engine)
        .build()
        .expect("valid config")
}

fn transient_503() -> EngineError {
    EngineError::new(EngineErrorKind::Unavailable, "HTTP 503 Service Unavailable")
}

fn summary_response() -> Value {
    json!({
        "title": "Greeting",
        "summary": "A short greeting.",
        "keyPoints": ["says hello"],
    })
}

// ── Input handling ───────────────────────────────────────────────────────────

#[tokio::test]
async fn word_document_is_rejected_before_any_engine_call() {
    let engine = ScriptedEngine::new(vec![]);
    let config = config_with(engine.clone());

    let reference = DocumentReference::encoded(format!(
        "data:application/msword;base64,{}",
        STANDARD.encode(b"not really a doc")
    ));
    let err = summarize(&reference, &config).await.unwrap_err();

    match &err {
        ExtractError::UnsupportedFormat { mime, hint } => {
            assert_eq!(mime, "application/msword");
            assert!(hint.contains("Convert the file to PDF or plain text"));
        }
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn malformed_reference_is_rejected_before_any_engine_call() {
    let engine = ScriptedEngine::new(vec![]);
    let config = config_with(engine.clone());

    // A content-type parameter breaks the reference form.
    let reference =
        DocumentReference::encoded("data:text/plain;charset=utf-8;base64,aGVsbG8=");
    let err = summarize(&reference, &config).await.unwrap_err();

    assert!(matches!(err, ExtractError::MalformedInput { .. }), "got {err:?}");
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn empty_reference_is_missing_document() {
    let engine = ScriptedEngine::new(vec![]);
    let config = config_with(engine.clone());

    let err = summarize(&DocumentReference::default(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::MissingDocument));
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn text_payload_is_decoded_and_forwarded() {
    let engine = ScriptedEngine::new(vec![Ok(Some(summary_response()))]);
    let config = config_with(engine.clone());

    let reference = DocumentReference::encoded("data:text/plain;base64,aGVsbG8=")
        .with_file_name("hello.txt");
    let summary = summarize(&reference, &config).await.unwrap();
    assert_eq!(summary.title, "Greeting");

    let calls = engine.recorded_calls();
    assert_eq!(calls.len(), 1);
    let (template_id, payload) = &calls[0];
    assert_eq!(*template_id, "summarize-document");
    assert_eq!(payload["document"]["kind"], "text");
    assert_eq!(payload["document"]["text"], "hello");
    assert_eq!(payload["fileName"], "hello.txt");
}

#[tokio::test]
async fn media_payload_is_forwarded_verbatim() {
    let engine = ScriptedEngine::new(vec![Ok(Some(json!({ "clauses": [] })))]);
    let config = config_with(engine.clone());

    let uri = format!("data:application/pdf;base64,{}", STANDARD.encode(b"%PDF-1.7"));
    let report = extract_clauses(&DocumentReference::encoded(uri.clone()), &config)
        .await
        .unwrap();
    assert!(report.clauses.is_empty());

    let calls = engine.recorded_calls();
    let payload = &calls[0].1;
    assert_eq!(payload["document"]["kind"], "media");
    assert_eq!(payload["document"]["mime"], "application/pdf");
    // The data-URI reaches the engine bit-identical to what the user sent.
    assert_eq!(payload["document"]["dataUri"], Value::String(uri));
}

// ── Retry behaviour ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_until_success() {
    let engine = ScriptedEngine::new(vec![
        Err(transient_503()),
        Err(transient_503()),
        Ok(Some(json!({ "findings": [{ "id": "a", "suggestion": "ship it" }] }))),
    ]);
    let config = config_with(engine.clone());

    let items = vec![BacklogItem {
        id: "a".into(),
        title: "Login page".into(),
        description: "As a user I want to log in".into(),
    }];

    let start = tokio::time::Instant::now();
    let findings = analyze_backlog(&items, &config).await.unwrap();

    assert_eq!(engine.call_count(), 3);
    assert_eq!(findings.len(), 1);
    assert!(!findings[0].flagged);
    // Batch policy: 1500ms after the first failure, 3000ms after the second.
    assert_eq!(start.elapsed(), std::time::Duration::from_millis(4500));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_as_service_overloaded() {
    let engine = ScriptedEngine::new(vec![
        Err(transient_503()),
        Err(EngineError::new(EngineErrorKind::RateLimited, "429 rate limit")),
        Err(EngineError::new(
            EngineErrorKind::ResourceExhausted,
            "resource has been exhausted",
        )),
    ]);
    let config = config_with(engine.clone());

    let items = vec![BacklogItem {
        id: "a".into(),
        title: "t".into(),
        description: "d".into(),
    }];
    let err = analyze_backlog(&items, &config).await.unwrap_err();

    assert_eq!(engine.call_count(), 3);
    match &err {
        ExtractError::ServiceOverloaded { attempts } => assert_eq!(*attempts, 3),
        other => panic!("expected ServiceOverloaded, got {other:?}"),
    }
    // User-facing message stays stable and never leaks transport diagnostics.
    assert!(err.to_string().contains("temporarily overloaded"));
    assert!(!err.to_string().contains("503"));
}

#[tokio::test]
async fn terminal_engine_error_is_not_retried() {
    let engine = ScriptedEngine::new(vec![Err(EngineError::new(
        EngineErrorKind::InvalidRequest,
        "400 Bad Request",
    ))]);
    let config = config_with(engine.clone());

    let reference = DocumentReference::text("hello");
    let err = summarize(&reference, &config).await.unwrap_err();

    assert_eq!(engine.call_count(), 1);
    assert!(matches!(err, ExtractError::Engine(_)), "got {err:?}");
}

#[tokio::test]
async fn engine_returning_nothing_is_no_output() {
    let engine = ScriptedEngine::new(vec![Ok(None), Ok(None)]);
    let config = config_with(engine.clone());

    let err = summarize(&DocumentReference::text("hello"), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::EngineNoOutput { .. }), "got {err:?}");
    // No-output is terminal: the interactive policy must not burn a retry on it.
    assert_eq!(engine.call_count(), 1);
}

// ── Backlog reconciliation ───────────────────────────────────────────────────

fn backlog(ids: &[&str]) -> Vec<BacklogItem> {
    ids.iter()
        .map(|id| BacklogItem {
            id: id.to_string(),
            title: format!("Story {id}"),
            description: "placeholder description".into(),
        })
        .collect()
}

#[tokio::test]
async fn dropped_backlog_item_gets_flagged_placeholder() {
    let engine = ScriptedEngine::new(vec![Ok(Some(json!({
        "findings": [{ "id": "a", "issues": ["too vague"], "suggestion": "split it" }]
    })))]);
    let config = config_with(engine.clone());

    let findings = analyze_backlog(&backlog(&["a", "b"]), &config).await.unwrap();

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].id, "a");
    assert!(!findings[0].flagged);
    assert_eq!(findings[1].id, "b");
    assert!(findings[1].flagged);
    assert!(findings[1].note.is_some());
}

#[tokio::test]
async fn orphan_and_duplicate_findings_are_resolved() {
    // The engine invents "x", drops "a", and returns "b" twice.
    let engine = ScriptedEngine::new(vec![Ok(Some(json!({
        "findings": [
            { "id": "b", "suggestion": "first answer" },
            { "id": "x", "suggestion": "who asked" },
            { "id": "b", "suggestion": "second answer" },
        ]
    })))]);
    let config = config_with(engine.clone());

    let findings = analyze_backlog(&backlog(&["a", "b"]), &config).await.unwrap();

    // Exactly one finding per input id, in input order; the orphan is gone.
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].id, "a");
    assert!(findings[0].flagged);
    assert_eq!(findings[1].id, "b");
    assert_eq!(findings[1].suggestion, "second answer");
}

#[tokio::test]
async fn empty_backlog_makes_no_engine_call() {
    let engine = ScriptedEngine::new(vec![]);
    let config = config_with(engine.clone());

    let findings = analyze_backlog(&[], &config).await.unwrap();

    assert!(findings.is_empty());
    assert_eq!(engine.call_count(), 0);
}

// ── News fan-out ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_article_yields_neutral_stub_without_aborting_siblings() {
    let corpus = NewsCorpus::simulated();
    let config = config_with(PerArticleEngine::new(&["n-003"]));

    let signals = score_articles("Meridian Robotics", &corpus, &config)
        .await
        .unwrap();

    assert_eq!(signals.len(), corpus.len());
    let stub = signals.iter().find(|s| s.id == "n-003").unwrap();
    assert!(!stub.relevant);
    assert_eq!(stub.sentiment, Sentiment::Neutral);
    // Every other article still produced a real signal.
    let ids: HashSet<&str> = signals.iter().map(|s| s.id.as_str()).collect();
    for article in corpus.articles() {
        assert!(ids.contains(article.id.as_str()));
    }
}

#[tokio::test]
async fn news_report_filters_relevance_and_counts_failures() {
    let corpus = NewsCorpus::simulated();
    let config = config_with(PerArticleEngine::new(&["n-003"]));

    let report = analyze_news("Meridian Robotics", &corpus, &config)
        .await
        .unwrap();

    assert_eq!(report.scanned, 5);
    assert_eq!(report.failed, 1);
    // n-003 (stub) and n-005 (off-topic) are filtered out of the signals.
    let ids: Vec<&str> = report.signals.iter().map(|s| s.id.as_str()).collect();
    assert!(!ids.contains(&"n-003"));
    assert!(!ids.contains(&"n-005"));
    assert_eq!(report.signals.len(), 3);
}

#[tokio::test]
async fn stream_yields_one_signal_per_article() {
    let corpus = NewsCorpus::simulated();
    let config = config_with(PerArticleEngine::new(&[]));

    let stream = news_stream("Meridian Robotics", &corpus, &config).unwrap();
    let signals: Vec<_> = stream.collect().await;

    assert_eq!(signals.len(), corpus.len());
    let ids: HashSet<&str> = signals.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), corpus.len());
}

#[tokio::test]
async fn stream_carries_stubs_for_failing_articles() {
    let corpus = NewsCorpus::new(vec![Article {
        id: "solo".into(),
        headline: "h".into(),
        body: "b".into(),
        published_at: "2026-01-01".into(),
    }]);
    let config = config_with(PerArticleEngine::new(&["solo"]));

    let stream = news_stream("anything", &corpus, &config).unwrap();
    let signals: Vec<_> = stream.collect().await;

    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].id, "solo");
    assert_eq!(signals[0].sentiment, Sentiment::Neutral);
}

// ── Engine wiring ────────────────────────────────────────────────────────────

#[tokio::test]
async fn mismatched_echoed_id_is_corrected() {
    struct WrongIdEngine;

    #[async_trait]
    impl InferenceEngine for WrongIdEngine {
        async fn generate(
            &self,
            _template: PromptTemplate,
            _payload: &Value,
            _output_schema: &Value,
        ) -> Result<Option<Value>, EngineError> {
            Ok(Some(json!({
                "id": "something-else",
                "relevant": true,
                "sentiment": "negative",
                "rationale": "confused engine",
            })))
        }
    }

    let corpus = NewsCorpus::new(vec![Article {
        id: "real-id".into(),
        headline: "h".into(),
        body: "b".into(),
        published_at: "2026-01-01".into(),
    }]);
    let config = config_with(Arc::new(WrongIdEngine));

    let signals = score_articles("t", &corpus, &config).await.unwrap();
    assert_eq!(signals[0].id, "real-id");
}

#[test]
fn backoff_delays_double_per_attempt() {
    let policy = RetryPolicy {
        max_attempts: 4,
        base_delay_ms: 250,
    };
    let delays: Vec<u64> = (0..3).map(|i| policy.backoff_delay(i).as_millis() as u64).collect();
    assert_eq!(delays, vec![250, 500, 1000]);
}
