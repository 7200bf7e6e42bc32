// src/bootstrap.rs
//! Wires lexicon, sentiment model and pipeline settings from the environment.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::engine::ComfortEngine;
use crate::lexicon::Lexicon;
use crate::pipeline::Pipeline;
use crate::sentiment::{LexiconPolarity, SentimentScorer};

/// Everything a front end (HTTP or CLI) needs, loaded once.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub lexicon: Arc<Lexicon>,
    pub config: PipelineConfig,
    pub pipeline: Arc<Pipeline>,
}

impl Runtime {
    pub fn from_env() -> Result<Self> {
        let lexicon = Lexicon::load_default().context("loading comfort lexicon")?;
        let config = PipelineConfig::load_default().context("loading pipeline config")?;
        Ok(Self::from_parts(lexicon, config))
    }

    pub fn from_parts(lexicon: Lexicon, config: PipelineConfig) -> Self {
        let scorer = build_scorer(&config);
        let engine = ComfortEngine::new(&lexicon, scorer, &config);
        let pipeline = Pipeline::new(Arc::new(engine), config.concurrency);
        info!(
            target: "pipeline",
            accessories = lexicon.accessories.len(),
            issues = lexicon.issues.len(),
            concurrency = config.concurrency,
            sentiment = pipeline.engine().sentiment().is_available(),
            "runtime ready"
        );
        Self {
            lexicon: Arc::new(lexicon),
            config,
            pipeline: Arc::new(pipeline),
        }
    }
}

/// A broken sentiment lexicon degrades to neutral scores rather than
/// refusing to start.
fn build_scorer(config: &PipelineConfig) -> SentimentScorer {
    if !config.sentiment_enabled {
        return SentimentScorer::unavailable();
    }
    match LexiconPolarity::load_default() {
        Ok(model) => SentimentScorer::new(Arc::new(model)),
        Err(e) => {
            warn!(
                target: "sentiment",
                error = %e,
                "sentiment lexicon unavailable; scores will be 0.0"
            );
            SentimentScorer::unavailable()
        }
    }
}
