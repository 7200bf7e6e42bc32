// src/pipeline.rs
//! Pipeline Driver: runs the engine over a batch, tallies aggregates and
//! isolates per-document failures.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::debug::{anon_hash, dev_logging_enabled};
use crate::engine::ComfortEngine;
use crate::error::{EngineError, EngineResult};
use crate::metrics::ensure_metrics_described;
use crate::records::{AccessoryMention, ComfortIssue, Document, DocumentRecords};
use crate::report::AggregateCounts;

/// Outcome of a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Analyzed(DocumentRecords),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentFailure {
    pub review_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentRecords>,
    pub counts: AggregateCounts,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    pub fn accessory_mentions(&self) -> impl Iterator<Item = (&str, &AccessoryMention)> {
        self.documents.iter().flat_map(|d| {
            d.accessory_mentions
                .iter()
                .map(move |m| (d.review_id.as_str(), m))
        })
    }

    pub fn comfort_issues(&self) -> impl Iterator<Item = (&str, &ComfortIssue)> {
        self.documents
            .iter()
            .flat_map(|d| d.comfort_issues.iter().map(move |i| (d.review_id.as_str(), i)))
    }

    pub fn into_parts(self) -> (Vec<AccessoryMention>, Vec<ComfortIssue>, AggregateCounts) {
        let mut mentions = Vec::new();
        let mut issues = Vec::new();
        for d in self.documents {
            mentions.extend(d.accessory_mentions);
            issues.extend(d.comfort_issues);
        }
        (mentions, issues, self.counts)
    }

    fn absorb(&mut self, review_id: String, res: EngineResult<Outcome>) {
        match res {
            Ok(Outcome::Analyzed(recs)) => {
                self.counts.record_document(&recs);
                self.documents.push(recs);
            }
            Ok(Outcome::Empty) => self.counts.record_empty(),
            Err(e) => {
                self.counts.record_failure();
                self.failures.push(DocumentFailure {
                    review_id,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    engine: Arc<ComfortEngine>,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(engine: Arc<ComfortEngine>, concurrency: usize) -> Self {
        ensure_metrics_described();
        Self {
            engine,
            concurrency: concurrency.max(1),
        }
    }

    pub fn engine(&self) -> &ComfortEngine {
        &self.engine
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Analyze one document; a panic inside the engine becomes
    /// `EngineError::Document`.
    pub fn analyze_one(&self, doc: &Document) -> EngineResult<Outcome> {
        analyze_guarded(&self.engine, doc)
    }

    /// Sequential batch run in input order.
    pub fn run(&self, documents: &[Document]) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport::default();
        for doc in documents {
            let res = self.analyze_one(doc);
            report.absorb(doc.id.clone(), res);
        }
        log_batch(&report, started);
        report
    }

    /// Batch run on the blocking pool, at most `self.concurrency` documents at
    /// a time. Records come back in input order.
    pub async fn run_concurrent(&self, documents: Vec<Document>) -> BatchReport {
        self.run_concurrent_with(documents, self.concurrency).await
    }

    pub async fn run_concurrent_with(&self, documents: Vec<Document>, limit: usize) -> BatchReport {
        let started = Instant::now();
        let sem = Arc::new(Semaphore::new(limit.max(1)));

        let mut handles = Vec::with_capacity(documents.len());
        for doc in documents {
            let sem = sem.clone();
            let engine = self.engine.clone();
            let id = doc.id.clone();
            let handle = tokio::spawn(async move {
                let rid = doc.id.clone();
                let _permit = match sem.acquire_owned().await {
                    Ok(p) => p,
                    Err(e) => {
                        return Err(EngineError::Document {
                            review_id: rid,
                            reason: format!("semaphore closed: {e}"),
                        })
                    }
                };
                match tokio::task::spawn_blocking(move || analyze_guarded(&engine, &doc)).await {
                    Ok(res) => res,
                    Err(e) => {
                        counter!("documents_failed_total").increment(1);
                        Err(EngineError::Document {
                            review_id: rid,
                            reason: format!("worker aborted: {e}"),
                        })
                    }
                }
            });
            handles.push((id, handle));
        }

        let mut report = BatchReport::default();
        for (id, handle) in handles {
            let res = match handle.await {
                Ok(r) => r,
                Err(e) => {
                    counter!("documents_failed_total").increment(1);
                    Err(EngineError::Document {
                        review_id: id.clone(),
                        reason: format!("task failed: {e}"),
                    })
                }
            };
            report.absorb(id, res);
        }
        log_batch(&report, started);
        report
    }
}

fn analyze_guarded(engine: &ComfortEngine, doc: &Document) -> EngineResult<Outcome> {
    if doc.is_blank() {
        counter!("documents_empty_total").increment(1);
        return Ok(Outcome::Empty);
    }

    let started = Instant::now();
    let res = panic::catch_unwind(AssertUnwindSafe(|| engine.analyze(doc)));
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match res {
        Ok(recs) => {
            counter!("documents_processed_total").increment(1);
            counter!("accessory_mentions_total").increment(recs.accessory_mentions.len() as u64);
            counter!("comfort_issues_total").increment(recs.comfort_issues.len() as u64);
            histogram!("document_analysis_ms").record(elapsed_ms);
            if dev_logging_enabled() {
                info!(
                    target: "pipeline",
                    id = %anon_hash(&doc.analysis_text()),
                    accessories = recs.accessory_mentions.len(),
                    issues = recs.comfort_issues.len(),
                    elapsed_ms,
                    "document analyzed"
                );
            }
            Ok(Outcome::Analyzed(recs))
        }
        Err(payload) => {
            counter!("documents_failed_total").increment(1);
            let reason = panic_message(payload.as_ref());
            warn!(target: "pipeline", review_id = %doc.id, %reason, "document failed; skipping");
            Err(EngineError::Document {
                review_id: doc.id.clone(),
                reason,
            })
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

fn log_batch(report: &BatchReport, started: Instant) {
    let c = &report.counts;
    info!(
        target: "pipeline",
        total = c.documents_total,
        analyzed = c.documents_analyzed,
        empty = c.documents_empty,
        failed = c.documents_failed,
        accessories = c.accessory_mentions,
        issues = c.comfort_issues,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn pipeline() -> Pipeline {
        let engine = ComfortEngine::from_lexicon(&Lexicon::builtin().unwrap());
        Pipeline::new(Arc::new(engine), 2)
    }

    #[test]
    fn blank_documents_are_counted_not_failed() {
        let p = pipeline();
        let report = p.run(&[Document::new("a", "", "   ")]);
        assert_eq!(report.counts.documents_empty, 1);
        assert_eq!(report.counts.documents_failed, 0);
        assert!(report.documents.is_empty());
    }

    #[test]
    fn panic_messages() {
        let p: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(p.as_ref()), "boom");
        let p: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(p.as_ref()), "bang");
        let p: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(p.as_ref()), "panic");
    }

    #[test]
    fn into_parts_flattens_in_order() {
        let p = pipeline();
        let docs = vec![
            Document::new("1", "", "my kiwi strap is great"),
            Document::new("2", "", "the anker power bank got hot"),
        ];
        let report = p.run(&docs);
        let ids: Vec<_> = report.accessory_mentions().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids.first().map(String::as_str), Some("1"));
        let (mentions, _issues, counts) = report.into_parts();
        assert_eq!(mentions.len() as u64, counts.accessory_mentions);
    }
}
