// tests/jsonl_sink.rs
//
// JsonlSink writes two line-delimited files and appends across instances.

use std::sync::Arc;

use quest_comfort_analyzer::config::PipelineConfig;
use quest_comfort_analyzer::sink::{
    persist_report, AccessoryRow, IssueRow, JsonlSink, ACCESSORY_FILE, ISSUE_FILE,
};
use quest_comfort_analyzer::{ComfortEngine, Document, Lexicon, Pipeline};

fn read_rows<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Vec<T> {
    std::fs::read_to_string(path)
        .expect("read output")
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json line"))
        .collect()
}

#[tokio::test]
async fn writes_one_line_per_record_and_appends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lex = Lexicon::builtin().unwrap();
    let p = Pipeline::new(Arc::new(ComfortEngine::from_lexicon(&lex)), 2);

    let long_tail = " and it was fine".repeat(60);
    let docs = vec![
        Document::new("a", "", format!("My kiwi strap is too heavy{long_tail}")),
        Document::new("b", "", "My elite strap broke after 2 months! Total waste of money."),
    ];
    let report = p.run_concurrent(docs).await;

    let sink = JsonlSink::create(dir.path()).await.expect("create sink");
    let stats = persist_report(&report, &sink, 80).await;
    sink.flush().await.unwrap();
    assert_eq!(stats.failed_writes, 0);

    let acc: Vec<AccessoryRow> = read_rows(&dir.path().join(ACCESSORY_FILE));
    let iss: Vec<IssueRow> = read_rows(&dir.path().join(ISSUE_FILE));
    assert_eq!(acc.len() as u64, report.counts.accessory_mentions);
    assert_eq!(iss.len() as u64, report.counts.comfort_issues);
    assert!(acc.iter().all(|r| r.context_snippet.chars().count() <= 80));
    assert!(acc.iter().any(|r| r.review_id == "a" && r.accessory_type == "head_strap"));
    assert!(iss.iter().any(|r| r.review_id == "b" && r.issue_type == "strap_quality"));

    drop(sink);
    let again = JsonlSink::create(dir.path()).await.unwrap();
    persist_report(&report, &again, PipelineConfig::default().max_snippet_chars).await;
    again.flush().await.unwrap();
    let acc2: Vec<AccessoryRow> = read_rows(&dir.path().join(ACCESSORY_FILE));
    assert_eq!(acc2.len(), acc.len() * 2);
}
