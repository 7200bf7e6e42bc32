// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze
// - POST /batch
// - GET /solutions, GET /solutions/{issue_type}

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use quest_comfort_analyzer::api::{self, AppState};
use quest_comfort_analyzer::bootstrap::Runtime;
use quest_comfort_analyzer::config::PipelineConfig;
use quest_comfort_analyzer::Lexicon;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Built-in lexicon, default settings; independent of env and cwd.
fn test_router() -> Router {
    let rt = Runtime::from_parts(
        Lexicon::builtin().expect("builtin lexicon"),
        PipelineConfig::default(),
    );
    api::router(AppState::from_runtime(&rt))
}

async fn read_json(resp: shuttle_axum::axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_analyze_returns_records() {
    let app = test_router();

    let payload = json!({
        "id": "r-1",
        "content": "The BoboVR M3 Pro is great, no more forehead pain"
    });
    let resp = app
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["review_id"], "r-1");
    assert_eq!(v["empty"], false);
    assert_eq!(v["accessory_mentions"][0]["canonical_name"], "BoboVR M3 Pro");
    assert_eq!(v["accessory_mentions"][0]["accessory_type"], "head_strap");

    let issues = v["comfort_issues"].as_array().expect("issues array");
    assert!(issues
        .iter()
        .any(|i| i["issue_type"] == "forehead_discomfort"));
    for i in issues {
        let sev = i["severity"].as_str().expect("severity string");
        assert!(["high", "medium", "low"].contains(&sev));
    }
}

#[tokio::test]
async fn api_analyze_accepts_text_alias_and_blank_input() {
    let app = test_router();

    let resp = app
        .oneshot(post_json("/analyze", &json!({ "text": "   " })))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["empty"], true);
    assert_eq!(v["document_sentiment"], 0.0);
    assert!(v["accessory_mentions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn api_batch_reports_counts() {
    let app = test_router();

    let payload = json!([
        {
            "id": 1,
            "title": "Returned",
            "content": "My elite strap broke after 2 months! Total waste of money."
        },
        { "id": "2", "content": "" },
        { "id": 3, "content": "Way too heavy for long sessions." }
    ]);
    let resp = app
        .oneshot(post_json("/batch", &payload))
        .await
        .expect("oneshot /batch");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["counts"]["documents_total"], 3);
    assert_eq!(v["counts"]["documents_empty"], 1);
    assert_eq!(v["counts"]["documents_failed"], 0);
    assert!(v["counts"]["by_severity"]["high"].as_u64().unwrap() >= 1);

    let ids: Vec<_> = v["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["review_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn api_solutions_known_and_unknown() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(Request::get("/solutions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert!(v.as_object().unwrap().contains_key("heat_sweating"));

    let resp = app
        .clone()
        .oneshot(
            Request::get("/solutions/forehead_discomfort")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["display_name"], "Forehead Discomfort");
    assert!(!v["solutions"].as_array().unwrap().is_empty());

    let resp = app
        .oneshot(Request::get("/solutions/does_not_exist").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
