use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::bootstrap::Runtime;
use crate::lexicon::Lexicon;
use crate::pipeline::{BatchReport, Outcome, Pipeline};
use crate::records::{AccessoryMention, ComfortIssue, Document, DocumentRecords};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub lexicon: Arc<Lexicon>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, lexicon: Arc<Lexicon>) -> Self {
        Self { pipeline, lexicon }
    }

    pub fn from_runtime(rt: &Runtime) -> Self {
        Self::new(rt.pipeline.clone(), rt.lexicon.clone())
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_runtime(&Runtime::from_env()?))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .route("/solutions", get(all_solutions))
        .route("/solutions/{issue_type}", get(issue_solutions))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct AnalyzeReq {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "text")]
    content: String,
}

#[derive(Serialize)]
struct AnalyzeResp {
    review_id: String,
    empty: bool,
    document_sentiment: f64,
    accessory_mentions: Vec<AccessoryMention>,
    comfort_issues: Vec<ComfortIssue>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: msg.into() })).into_response()
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Response {
    let doc = Document::new(body.id.unwrap_or_default(), body.title, body.content);
    let pipeline = state.pipeline.clone();

    let res = tokio::task::spawn_blocking(move || {
        let outcome = pipeline.analyze_one(&doc);
        let sentiment = pipeline
            .engine()
            .sentiment()
            .score_document(&doc.analysis_text());
        (doc.id, outcome, sentiment)
    })
    .await;

    let (review_id, outcome, document_sentiment) = match res {
        Ok(v) => v,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let (empty, recs) = match outcome {
        Ok(Outcome::Analyzed(recs)) => (false, recs),
        Ok(Outcome::Empty) => (true, DocumentRecords::empty(review_id.clone())),
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    Json(AnalyzeResp {
        review_id,
        empty,
        document_sentiment: if empty { 0.0 } else { document_sentiment },
        accessory_mentions: recs.accessory_mentions,
        comfort_issues: recs.comfort_issues,
    })
    .into_response()
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(docs): Json<Vec<Document>>,
) -> Json<BatchReport> {
    Json(state.pipeline.run_concurrent(docs).await)
}

async fn all_solutions(State(state): State<AppState>) -> Json<BTreeMap<String, Vec<String>>> {
    let out = state
        .lexicon
        .issues
        .iter()
        .map(|i| (i.issue_type.clone(), i.solutions.clone()))
        .collect();
    Json(out)
}

#[derive(Serialize)]
struct SolutionsOut<'a> {
    issue_type: String,
    display_name: String,
    solutions: &'a [String],
}

async fn issue_solutions(
    State(state): State<AppState>,
    Path(issue_type): Path<String>,
) -> Response {
    match state.lexicon.solutions_for(&issue_type) {
        Some(solutions) => Json(SolutionsOut {
            display_name: crate::report::issue_display_name(&issue_type),
            issue_type,
            solutions,
        })
        .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("unknown issue type '{issue_type}'"),
        ),
    }
}
