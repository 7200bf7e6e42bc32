// src/config/pipeline.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::extract::{ExtractOptions, DEFAULT_CONTEXT_RADIUS, DEFAULT_DEDUP_PREFIX};
use crate::sentiment::DEFAULT_SENTIMENT_WINDOW;

pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_PIPELINE_CONFIG_PATH: &str = "COMFORT_PIPELINE_CONFIG_PATH";
pub const ENV_CONCURRENCY: &str = "COMFORT_CONCURRENCY";

const MAX_CONCURRENCY: usize = 256;

fn default_context_radius() -> usize {
    DEFAULT_CONTEXT_RADIUS
}
fn default_dedup_prefix() -> usize {
    DEFAULT_DEDUP_PREFIX
}
fn default_sentiment_window() -> usize {
    DEFAULT_SENTIMENT_WINDOW
}
fn default_max_snippet() -> usize {
    500
}
fn default_concurrency() -> usize {
    4
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Chars of context kept on each side of a match.
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,
    /// Chars of the context that form the per-document dedup key.
    #[serde(default = "default_dedup_prefix")]
    pub dedup_prefix_chars: usize,
    /// Chars on each side of a term for localized sentiment.
    #[serde(default = "default_sentiment_window")]
    pub sentiment_window: usize,
    /// Snippet cap applied when records are handed to a sink.
    #[serde(default = "default_max_snippet")]
    pub max_snippet_chars: usize,
    /// Documents analysed in parallel by `run_concurrent`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// `false` runs without a polarity model (all scores 0.0).
    #[serde(default = "default_true")]
    pub sentiment_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_radius: default_context_radius(),
            dedup_prefix_chars: default_dedup_prefix(),
            sentiment_window: default_sentiment_window(),
            max_snippet_chars: default_max_snippet(),
            concurrency: default_concurrency(),
            sentiment_enabled: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// 1) $COMFORT_PIPELINE_CONFIG_PATH (must exist)
    /// 2) config/pipeline.toml
    /// 3) defaults
    /// then $COMFORT_CONCURRENCY on top.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_PIPELINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_PIPELINE_CONFIG_PATH} points to non-existent path"
                ));
            }
            Self::load_from_file(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_PIPELINE_CONFIG_PATH);
            if p.exists() {
                Self::load_from_file(&p)?
            } else {
                Self::default()
            }
        };

        if let Some(n) = parse_concurrency_env(env::var(ENV_CONCURRENCY).ok()) {
            cfg.concurrency = n;
        }
        Ok(cfg.sanitized())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            context_radius: self.context_radius,
            dedup_prefix: self.dedup_prefix_chars,
        }
    }

    fn sanitized(mut self) -> Self {
        self.concurrency = self.concurrency.clamp(1, MAX_CONCURRENCY);
        if self.max_snippet_chars == 0 {
            self.max_snippet_chars = default_max_snippet();
        }
        self
    }
}

fn parse_concurrency_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}
