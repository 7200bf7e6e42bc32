// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod error;
pub mod text;

// Lexicon-driven analysis
pub mod extract;
pub mod lexicon;
pub mod normalize;
pub mod sentiment;
pub mod severity;

// Batch processing
pub mod engine;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod sink;

// Wiring & ambient concerns
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod debug;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::engine::ComfortEngine;
pub use crate::error::{EngineError, EngineResult};
pub use crate::lexicon::Lexicon;
pub use crate::pipeline::{BatchReport, Pipeline};
pub use crate::records::{AccessoryMention, ComfortIssue, Document, DocumentRecords};
pub use crate::severity::Severity;
