use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static DESCRIBED: OnceCell<()> = OnceCell::new();

/// Register descriptions for every series the engine emits. Idempotent.
pub fn ensure_metrics_described() {
    DESCRIBED.get_or_init(|| {
        describe_counter!("documents_processed_total", "Documents analyzed");
        describe_counter!("documents_failed_total", "Documents skipped after an internal failure");
        describe_counter!("documents_empty_total", "Blank documents skipped");
        describe_counter!("accessory_mentions_total", "Accessory mention records produced");
        describe_counter!("comfort_issues_total", "Comfort issue records produced");
        describe_counter!(
            "lexicon_patterns_skipped_total",
            "Lexicon patterns that failed to compile"
        );
        describe_counter!("sentiment_fallback_total", "Polarity failures scored as 0.0");
        describe_counter!("sink_write_errors_total", "Record sink write failures");
        describe_histogram!(
            "document_analysis_ms",
            Unit::Milliseconds,
            "Per-document analysis latency"
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if a recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
