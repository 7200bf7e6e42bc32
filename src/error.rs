use std::io;

use thiserror::Error;

/// Failures the engine can observe. None of them is fatal to a batch: each
/// variant is converted into its fail-soft/fail-open policy at the component
/// boundary that produced it.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("category '{category}': pattern `{pattern}` does not compile: {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("sentiment model unavailable: {0}")]
    Sentiment(String),
    #[error("lexicon error: {0}")]
    Lexicon(String),
    #[error("record sink rejected write for review '{review_id}': {reason}")]
    Sink { review_id: String, reason: String },
    #[error("document '{review_id}' failed: {reason}")]
    Document { review_id: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
