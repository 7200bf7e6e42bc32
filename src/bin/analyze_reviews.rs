//! Batch CLI: analyze a JSON Lines file of reviews and print a summary.
//!
//! Usage: analyze_reviews <reviews.jsonl> [out_dir]
//!
//! Each input line is `{"id": ..., "title": ..., "content": ...}`. Records
//! are appended to `<out_dir>/accessory_mentions.jsonl` and
//! `<out_dir>/comfort_issues.jsonl` (default out_dir: `out`).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quest_comfort_analyzer::{
    bootstrap::Runtime,
    records::read_documents_jsonl,
    report::{issue_display_name, AggregateCounts},
    sentiment::sentiment_label,
    severity::Severity,
    sink::{persist_report, JsonlSink, PersistStats},
};

const TOP_ACCESSORIES: usize = 15;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().compact())
        .try_init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: analyze_reviews <reviews.jsonl> [out_dir]");
    };
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("out"));

    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let (docs, bad_lines) = read_documents_jsonl(BufReader::new(file))
        .with_context(|| format!("reading {}", input.display()))?;
    for e in &bad_lines {
        warn!(line = e.line, reason = %e.reason, "skipping malformed input line");
    }

    let rt = Runtime::from_env()?;
    let report = rt.pipeline.run_concurrent(docs).await;

    let sink = JsonlSink::create(&out_dir)
        .await
        .with_context(|| format!("opening output dir {}", out_dir.display()))?;
    let stats = persist_report(&report, &sink, rt.config.max_snippet_chars).await;
    sink.flush().await?;

    print_summary(&report.counts, &stats, bad_lines.len());
    println!("\nRecords written to {}", sink.dir().display());
    Ok(())
}

fn print_summary(c: &AggregateCounts, stats: &PersistStats, bad_lines: usize) {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("QUEST 3 ACCESSORY & COMFORT SUMMARY");
    println!("{rule}");
    println!(
        "Documents: {} ({} analyzed, {} empty, {} failed, {} unreadable lines)",
        c.documents_total,
        c.documents_analyzed,
        c.documents_empty,
        c.documents_failed,
        bad_lines
    );
    println!("Accessory mentions: {}", c.accessory_mentions);
    println!("Unique accessories: {}", c.unique_accessories());
    println!("Comfort issues: {}", c.comfort_issues);
    println!("Records written: {} ({} failed)", stats.written, stats.failed_writes);

    println!("\nTop {TOP_ACCESSORIES} accessories:");
    for (name, t) in c.top_accessories(TOP_ACCESSORIES) {
        let avg = t.avg_sentiment();
        println!(
            "  {:<28} {:>4} mentions  sentiment {:+.2} ({})",
            name,
            t.mentions,
            avg,
            sentiment_label(avg)
        );
    }

    println!("\nComfort issues by category:");
    for (issue, n) in c.issues_by_count() {
        println!("  {:<28} {:>4}", issue_display_name(issue), n);
    }

    println!("\nIssues by severity:");
    for sev in Severity::ALL {
        let n = c.by_severity.get(&sev).copied().unwrap_or(0);
        println!("  {:<8} {:>4}", sev.as_str(), n);
    }
}
