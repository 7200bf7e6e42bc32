//! Quest Comfort Analyzer — HTTP entrypoint
//! Boots the Axum server: lexicon + pipeline state, engine routes and `/metrics`.
//!
//! See `README.md` for quickstart.

use quest_comfort_analyzer::{api, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - COMFORT_DEV_LOG=1
fn enable_dev_tracing() {
    if !quest_comfort_analyzer::debug::dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pipeline=info,lexicon=info,sentiment=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    // Recorder first so metric descriptions land in it.
    let metrics = Metrics::init()?;

    let state = api::AppState::from_env()?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
