// tests/metrics.rs
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use quest_comfort_analyzer::metrics::Metrics;
use quest_comfort_analyzer::{ComfortEngine, Document, Lexicon, Pipeline};

// Single test: the Prometheus recorder is process-global.
#[tokio::test]
async fn metrics_endpoint_contains_pipeline_series() {
    let metrics = Metrics::init().expect("install recorder");
    let app = metrics.router();

    let lex = Lexicon::builtin().unwrap();
    let p = Pipeline::new(Arc::new(ComfortEngine::from_lexicon(&lex)), 1);
    p.run(&[
        Document::new("1", "", "my kiwi strap is too heavy"),
        Document::new("2", "", " "),
    ]);

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "documents_processed_total",
        "documents_empty_total",
        "accessory_mentions_total",
        "comfort_issues_total",
        "document_analysis_ms",
    ] {
        assert!(text.contains(needle), "missing series {needle} in:\n{text}");
    }

    assert!(Metrics::init().is_err(), "second recorder must be rejected");
}
