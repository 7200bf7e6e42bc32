// src/sink.rs
//! Record persistence. The pipeline only knows the `RecordSink` trait;
//! storage failures are counted and logged, never fatal to a batch.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::pipeline::BatchReport;
use crate::severity::Severity;
use crate::text::truncate_chars;

pub const MAX_SNIPPET_CHARS: usize = 500;

pub const ACCESSORY_FILE: &str = "accessory_mentions.jsonl";
pub const ISSUE_FILE: &str = "comfort_issues.jsonl";

#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    async fn record_accessory_mention(
        &self,
        review_id: &str,
        canonical_name: &str,
        accessory_type: &str,
        sentiment_score: f64,
        context_snippet: &str,
    ) -> EngineResult<()>;

    async fn record_comfort_issue(
        &self,
        review_id: &str,
        issue_type: &str,
        severity: Severity,
        context_snippet: &str,
    ) -> EngineResult<()>;
}

/// Flat rows as written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryRow {
    pub review_id: String,
    pub canonical_name: String,
    pub accessory_type: String,
    pub sentiment_score: f64,
    pub context_snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRow {
    pub review_id: String,
    pub issue_type: String,
    pub severity: Severity,
    pub context_snippet: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistStats {
    pub written: u64,
    pub failed_writes: u64,
}

/// Push every record of `report` into `sink`, snippets capped at
/// `max_snippet_chars`.
pub async fn persist_report<S: RecordSink + ?Sized>(
    report: &BatchReport,
    sink: &S,
    max_snippet_chars: usize,
) -> PersistStats {
    let mut stats = PersistStats::default();

    for (rid, m) in report.accessory_mentions() {
        let res = sink
            .record_accessory_mention(
                rid,
                &m.canonical_name,
                &m.accessory_type,
                m.sentiment_score,
                truncate_chars(&m.context_snippet, max_snippet_chars),
            )
            .await;
        tally(&mut stats, rid, res);
    }

    for (rid, i) in report.comfort_issues() {
        let res = sink
            .record_comfort_issue(
                rid,
                &i.issue_type,
                i.severity,
                truncate_chars(&i.context_snippet, max_snippet_chars),
            )
            .await;
        tally(&mut stats, rid, res);
    }

    stats
}

fn tally(stats: &mut PersistStats, review_id: &str, res: EngineResult<()>) {
    match res {
        Ok(()) => stats.written += 1,
        Err(e) => {
            stats.failed_writes += 1;
            counter!("sink_write_errors_total").increment(1);
            warn!(target: "pipeline", %review_id, error = %e, "sink write failed");
        }
    }
}

/// In-memory sink for tests and the HTTP surface.
#[derive(Debug, Default)]
pub struct MemorySink {
    accessories: Mutex<Vec<AccessoryRow>>,
    issues: Mutex<Vec<IssueRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessories(&self) -> Vec<AccessoryRow> {
        self.accessories
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn issues(&self) -> Vec<IssueRow> {
        self.issues.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl RecordSink for MemorySink {
    async fn record_accessory_mention(
        &self,
        review_id: &str,
        canonical_name: &str,
        accessory_type: &str,
        sentiment_score: f64,
        context_snippet: &str,
    ) -> EngineResult<()> {
        let row = AccessoryRow {
            review_id: review_id.to_string(),
            canonical_name: canonical_name.to_string(),
            accessory_type: accessory_type.to_string(),
            sentiment_score,
            context_snippet: context_snippet.to_string(),
        };
        self.accessories
            .lock()
            .map_err(|_| poisoned(review_id))?
            .push(row);
        Ok(())
    }

    async fn record_comfort_issue(
        &self,
        review_id: &str,
        issue_type: &str,
        severity: Severity,
        context_snippet: &str,
    ) -> EngineResult<()> {
        let row = IssueRow {
            review_id: review_id.to_string(),
            issue_type: issue_type.to_string(),
            severity,
            context_snippet: context_snippet.to_string(),
        };
        self.issues.lock().map_err(|_| poisoned(review_id))?.push(row);
        Ok(())
    }
}

fn poisoned(review_id: &str) -> EngineError {
    EngineError::Sink {
        review_id: review_id.to_string(),
        reason: "lock poisoned".into(),
    }
}

/// Appends one JSON object per line to `accessory_mentions.jsonl` and
/// `comfort_issues.jsonl` under `dir`.
#[derive(Debug)]
pub struct JsonlSink {
    dir: PathBuf,
    accessories: tokio::sync::Mutex<File>,
    issues: tokio::sync::Mutex<File>,
}

impl JsonlSink {
    pub async fn create(dir: impl AsRef<Path>) -> EngineResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        let accessories = open_append(&dir.join(ACCESSORY_FILE)).await?;
        let issues = open_append(&dir.join(ISSUE_FILE)).await?;
        Ok(Self {
            dir,
            accessories: tokio::sync::Mutex::new(accessories),
            issues: tokio::sync::Mutex::new(issues),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn flush(&self) -> EngineResult<()> {
        self.accessories.lock().await.flush().await?;
        self.issues.lock().await.flush().await?;
        Ok(())
    }
}

async fn open_append(path: &Path) -> EngineResult<File> {
    Ok(OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?)
}

async fn write_line<T: Serialize>(
    file: &tokio::sync::Mutex<File>,
    review_id: &str,
    row: &T,
) -> EngineResult<()> {
    let mut line = serde_json::to_string(row).map_err(|e| EngineError::Sink {
        review_id: review_id.to_string(),
        reason: e.to_string(),
    })?;
    line.push('\n');
    file.lock().await.write_all(line.as_bytes()).await?;
    Ok(())
}

#[async_trait::async_trait]
impl RecordSink for JsonlSink {
    async fn record_accessory_mention(
        &self,
        review_id: &str,
        canonical_name: &str,
        accessory_type: &str,
        sentiment_score: f64,
        context_snippet: &str,
    ) -> EngineResult<()> {
        let row = AccessoryRow {
            review_id: review_id.to_string(),
            canonical_name: canonical_name.to_string(),
            accessory_type: accessory_type.to_string(),
            sentiment_score,
            context_snippet: context_snippet.to_string(),
        };
        write_line(&self.accessories, review_id, &row).await
    }

    async fn record_comfort_issue(
        &self,
        review_id: &str,
        issue_type: &str,
        severity: Severity,
        context_snippet: &str,
    ) -> EngineResult<()> {
        let row = IssueRow {
            review_id: review_id.to_string(),
            issue_type: issue_type.to_string(),
            severity,
            context_snippet: context_snippet.to_string(),
        };
        write_line(&self.issues, review_id, &row).await
    }
}
