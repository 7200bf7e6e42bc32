// tests/scenarios.rs
//
// End-to-end behaviour of the built-in lexicon on hand-picked reviews.

use quest_comfort_analyzer::{ComfortEngine, Document, Lexicon, Severity};

fn engine() -> ComfortEngine {
    ComfortEngine::from_lexicon(&Lexicon::builtin().expect("builtin lexicon"))
}

#[test]
fn bobovr_review_yields_strap_and_forehead_issue() {
    let e = engine();
    let recs = e.analyze(&Document::new(
        "r-1",
        "",
        "The BoboVR M3 Pro is great, no more forehead pain",
    ));

    let names: Vec<_> = recs
        .accessory_mentions
        .iter()
        .map(|m| (m.canonical_name.as_str(), m.accessory_type.as_str()))
        .collect();
    assert_eq!(names, vec![("BoboVR M3 Pro", "head_strap")]);

    let issue_types: Vec<_> = recs.comfort_issues.iter().map(|i| i.issue_type.as_str()).collect();
    assert!(issue_types.contains(&"forehead_discomfort"), "got {issue_types:?}");
}

#[test]
fn broken_elite_strap_is_high_severity_strap_quality() {
    let e = engine();
    let recs = e.analyze(&Document::new(
        "r-2",
        "",
        "My elite strap broke after 2 months! Total waste of money.",
    ));

    let strap: Vec<_> = recs
        .comfort_issues
        .iter()
        .filter(|i| i.issue_type == "strap_quality")
        .collect();
    assert_eq!(strap.len(), 1, "identical contexts collapse to one record");
    assert_eq!(strap[0].severity, Severity::High);

    assert!(recs
        .accessory_mentions
        .iter()
        .any(|m| m.accessory_type == "head_strap"));
}

#[test]
fn title_takes_part_in_analysis() {
    let e = engine();
    let recs = e.analyze(&Document::new("r-3", "Kiwi strap review", "Five stars."));
    assert!(recs
        .accessory_mentions
        .iter()
        .any(|m| m.context_snippet.starts_with("Kiwi strap review")));
}

#[test]
fn positive_review_scores_above_negative_one() {
    let e = engine();
    let good = e.accessory_mentions("I love my kiwi strap, it is comfortable and great");
    let bad = e.accessory_mentions("My kiwi strap is terrible, painful and cheap");
    assert!(!good.is_empty() && !bad.is_empty());
    assert!(good[0].sentiment_score > bad[0].sentiment_score);
}

#[test]
fn review_without_lexicon_terms_produces_nothing() {
    let e = engine();
    let recs = e.analyze(&Document::new("r-4", "Nice", "Bought it for my nephew."));
    assert!(recs.is_empty());
}
