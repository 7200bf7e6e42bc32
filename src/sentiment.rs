//! # Sentiment Scorer
//! Whole-document polarity and polarity localized around a term.
//!
//! The polarity model itself is a black box behind `PolarityModel`; this
//! module only decides which windows get scored and how they are combined.
//! Any failure of the model (or no model at all) degrades to `0.0`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use metrics::counter;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::text::{fold, FoldedText};

pub const DEFAULT_SENTIMENT_WINDOW: usize = 50;
pub const ENV_SENTIMENT_LEXICON_PATH: &str = "COMFORT_SENTIMENT_LEXICON_PATH";

static BUILTIN_WORDS: Lazy<Arc<HashMap<String, f64>>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    Arc::new(serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon"))
});

/// Anything that maps text to a polarity in [-1, 1]. Must be deterministic
/// for a fixed input.
pub trait PolarityModel: Send + Sync {
    fn name(&self) -> &str;
    fn polarity(&self, text: &str) -> EngineResult<f64>;
}

/// Word-lexicon polarity: mean of the scores of the lexicon words found,
/// with intensifiers (x1.3) and negation in the previous 1..=3 tokens
/// (x -0.5).
#[derive(Debug, Clone)]
pub struct LexiconPolarity {
    words: Arc<HashMap<String, f64>>,
}

impl LexiconPolarity {
    pub fn builtin() -> Self {
        Self {
            words: Arc::clone(&BUILTIN_WORDS),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, f64> = serde_json::from_str(raw)?;
        let words = parsed
            .into_iter()
            .map(|(w, s)| (fold(w.trim()), s.clamp(-1.0, 1.0)))
            .collect();
        Ok(Self {
            words: Arc::new(words),
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading sentiment lexicon {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("parsing sentiment lexicon {}", path.display()))
    }

    /// `$COMFORT_SENTIMENT_LEXICON_PATH` if set, built-in words otherwise.
    pub fn load_default() -> Result<Self> {
        match std::env::var(ENV_SENTIMENT_LEXICON_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_SENTIMENT_LEXICON_PATH} points to non-existent path"
                    ));
                }
                Self::load_from(&pb)
            }
            Err(_) => Ok(Self::builtin()),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    fn word_score(&self, w: &str) -> Option<f64> {
        self.words.get(w).copied()
    }

    fn score_tokens(&self, tokens: &[String]) -> f64 {
        let mut sum = 0.0f64;
        let mut n = 0usize;

        for i in 0..tokens.len() {
            let Some(base) = self.word_score(tokens[i].as_str()) else {
                continue;
            };

            let mut v = base;
            if i >= 1 && is_intensifier(tokens[i - 1].as_str()) {
                v *= 1.3;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                v *= -0.5;
            }

            sum += v;
            n += 1;
        }

        if n == 0 {
            0.0
        } else {
            (sum / n as f64).clamp(-1.0, 1.0)
        }
    }
}

impl PolarityModel for LexiconPolarity {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> EngineResult<f64> {
        let tokens: Vec<String> = tokenize(text).collect();
        Ok(self.score_tokens(&tokens))
    }
}

/// Lowercased word tokens; inner apostrophes are kept ("can't", "doesn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '\u{2019}')
        .map(|t| t.trim_matches(|c: char| c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| fold(t).replace('\u{2019}', "'"))
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
            | "hardly"
    )
}

fn is_intensifier(tok: &str) -> bool {
    matches!(
        tok,
        "very" | "really" | "extremely" | "super" | "so" | "too" | "incredibly" | "absolutely"
            | "totally"
    )
}

/// Polarity label used in reports.
pub fn sentiment_label(score: f64) -> &'static str {
    if score > 0.1 {
        "positive"
    } else if score < -0.1 {
        "negative"
    } else {
        "neutral"
    }
}

/// Fail-open scorer over an optional polarity model.
#[derive(Clone)]
pub struct SentimentScorer {
    model: Option<Arc<dyn PolarityModel>>,
    window: usize,
}

impl fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentScorer")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("window", &self.window)
            .finish()
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(Arc::new(LexiconPolarity::builtin()))
    }
}

impl SentimentScorer {
    pub fn new(model: Arc<dyn PolarityModel>) -> Self {
        Self {
            model: Some(model),
            window: DEFAULT_SENTIMENT_WINDOW,
        }
    }

    /// A scorer with no backend: every score is `0.0`.
    pub fn unavailable() -> Self {
        Self {
            model: None,
            window: DEFAULT_SENTIMENT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Model result as an explicit `Result`; `score_document` is the
    /// fail-open wrapper around it.
    pub fn try_score_document(&self, text: &str) -> EngineResult<f64> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| EngineError::Sentiment("no polarity model configured".into()))?;
        let v = model.polarity(text)?;
        if !v.is_finite() {
            return Err(EngineError::Sentiment(format!(
                "model '{}' returned non-finite polarity",
                model.name()
            )));
        }
        Ok(v.clamp(-1.0, 1.0))
    }

    pub fn score_document(&self, text: &str) -> f64 {
        match self.try_score_document(text) {
            Ok(v) => v,
            Err(e) => {
                if self.model.is_some() {
                    warn!(target: "sentiment", error = %e, "polarity failed; scoring 0.0");
                    counter!("sentiment_fallback_total").increment(1);
                } else {
                    debug!(target: "sentiment", "no polarity model; scoring 0.0");
                }
                0.0
            }
        }
    }

    /// Mean polarity over windows centred on every occurrence of `term`,
    /// using the scorer's configured window.
    pub fn score_term_localized(&self, text: &str, term: &str) -> f64 {
        self.score_term_in_window(text, term, self.window)
    }

    pub fn score_term_in_window(&self, text: &str, term: &str, window: usize) -> f64 {
        let snippets = term_snippets(text, term, window);
        if snippets.is_empty() {
            return self.score_document(text);
        }
        let sum: f64 = snippets.iter().map(|s| self.score_document(s)).sum();
        sum / snippets.len() as f64
    }
}

/// Windows of `window` chars on each side of every case-insensitive
/// occurrence of `term` (overlapping occurrences included).
pub fn term_snippets<'a>(text: &'a str, term: &str, window: usize) -> Vec<&'a str> {
    if text.is_empty() || term.is_empty() {
        return Vec::new();
    }
    let doc = FoldedText::new(text);
    doc.occurrences(&fold(term))
        .into_iter()
        .map(|(s, e)| doc.window(s, e, window))
        .collect()
}
