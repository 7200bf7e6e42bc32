// src/report.rs
//! Batch aggregates for reporting. Nothing here feeds back into analysis.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::normalize::title_case;
use crate::records::DocumentRecords;
use crate::severity::Severity;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccessoryTally {
    pub accessory_type: String,
    pub mentions: u64,
    pub sentiment_sum: f64,
}

impl AccessoryTally {
    pub fn avg_sentiment(&self) -> f64 {
        if self.mentions == 0 {
            0.0
        } else {
            self.sentiment_sum / self.mentions as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateCounts {
    pub documents_total: u64,
    pub documents_analyzed: u64,
    pub documents_empty: u64,
    pub documents_failed: u64,
    pub accessory_mentions: u64,
    pub comfort_issues: u64,
    /// canonical name -> tally
    pub by_accessory: BTreeMap<String, AccessoryTally>,
    pub by_issue_type: BTreeMap<String, u64>,
    pub by_severity: BTreeMap<Severity, u64>,
}

impl Default for AggregateCounts {
    fn default() -> Self {
        Self {
            documents_total: 0,
            documents_analyzed: 0,
            documents_empty: 0,
            documents_failed: 0,
            accessory_mentions: 0,
            comfort_issues: 0,
            by_accessory: BTreeMap::new(),
            by_issue_type: BTreeMap::new(),
            by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
        }
    }
}

impl AggregateCounts {
    pub fn record_document(&mut self, recs: &DocumentRecords) {
        self.documents_total += 1;
        self.documents_analyzed += 1;

        for m in &recs.accessory_mentions {
            self.accessory_mentions += 1;
            let t = self
                .by_accessory
                .entry(m.canonical_name.clone())
                .or_insert_with(|| AccessoryTally {
                    accessory_type: m.accessory_type.clone(),
                    ..Default::default()
                });
            t.mentions += 1;
            t.sentiment_sum += m.sentiment_score;
        }

        for i in &recs.comfort_issues {
            self.comfort_issues += 1;
            *self.by_issue_type.entry(i.issue_type.clone()).or_insert(0) += 1;
            *self.by_severity.entry(i.severity).or_insert(0) += 1;
        }
    }

    pub fn record_empty(&mut self) {
        self.documents_total += 1;
        self.documents_empty += 1;
    }

    pub fn record_failure(&mut self) {
        self.documents_total += 1;
        self.documents_failed += 1;
    }

    pub fn merge(&mut self, other: &AggregateCounts) {
        self.documents_total += other.documents_total;
        self.documents_analyzed += other.documents_analyzed;
        self.documents_empty += other.documents_empty;
        self.documents_failed += other.documents_failed;
        self.accessory_mentions += other.accessory_mentions;
        self.comfort_issues += other.comfort_issues;

        for (name, t) in &other.by_accessory {
            let mine = self
                .by_accessory
                .entry(name.clone())
                .or_insert_with(|| AccessoryTally {
                    accessory_type: t.accessory_type.clone(),
                    ..Default::default()
                });
            mine.mentions += t.mentions;
            mine.sentiment_sum += t.sentiment_sum;
        }
        for (k, v) in &other.by_issue_type {
            *self.by_issue_type.entry(k.clone()).or_insert(0) += v;
        }
        for (k, v) in &other.by_severity {
            *self.by_severity.entry(*k).or_insert(0) += v;
        }
    }

    pub fn unique_accessories(&self) -> usize {
        self.by_accessory.len()
    }

    /// Most mentioned first; ties by name.
    pub fn top_accessories(&self, n: usize) -> Vec<(&str, &AccessoryTally)> {
        let mut v: Vec<_> = self
            .by_accessory
            .iter()
            .map(|(k, t)| (k.as_str(), t))
            .collect();
        v.sort_by(|a, b| b.1.mentions.cmp(&a.1.mentions).then_with(|| a.0.cmp(b.0)));
        v.truncate(n);
        v
    }

    pub fn issues_by_count(&self) -> Vec<(&str, u64)> {
        let mut v: Vec<_> = self
            .by_issue_type
            .iter()
            .map(|(k, c)| (k.as_str(), *c))
            .collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        v
    }
}

/// "forehead_discomfort" -> "Forehead Discomfort"
pub fn issue_display_name(issue_type: &str) -> String {
    title_case(&issue_type.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AccessoryMention, ComfortIssue};

    fn recs(id: &str, acc: &[(&str, f64)], issues: &[(&str, Severity)]) -> DocumentRecords {
        DocumentRecords {
            review_id: id.into(),
            accessory_mentions: acc
                .iter()
                .map(|(n, s)| AccessoryMention {
                    canonical_name: n.to_string(),
                    accessory_type: "head_strap".into(),
                    sentiment_score: *s,
                    context_snippet: String::new(),
                    trigger: None,
                })
                .collect(),
            comfort_issues: issues
                .iter()
                .map(|(t, sev)| ComfortIssue {
                    issue_type: t.to_string(),
                    severity: *sev,
                    context_snippet: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn severity_buckets_start_at_zero() {
        let c = AggregateCounts::default();
        assert_eq!(c.by_severity.len(), 3);
        assert!(c.by_severity.values().all(|v| *v == 0));
    }

    #[test]
    fn tallies_and_averages() {
        let mut c = AggregateCounts::default();
        c.record_document(&recs(
            "1",
            &[("Kiwi", 0.5), ("Bobo", 0.1)],
            &[("weight", Severity::High)],
        ));
        c.record_document(&recs(
            "2",
            &[("Kiwi", -0.1)],
            &[("weight", Severity::Low), ("heat_sweating", Severity::Low)],
        ));
        c.record_empty();
        c.record_failure();

        assert_eq!(c.documents_total, 4);
        assert_eq!(c.documents_analyzed, 2);
        assert_eq!(c.accessory_mentions, 3);
        assert_eq!(c.comfort_issues, 3);
        assert_eq!(c.by_severity[&Severity::Low], 2);

        let top = c.top_accessories(15);
        assert_eq!(top[0].0, "Kiwi");
        assert!((top[0].1.avg_sentiment() - 0.2).abs() < 1e-9);
        assert_eq!(c.issues_by_count()[0], ("weight", 2));
    }

    #[test]
    fn merge_matches_sequential_recording() {
        let a_recs = recs("1", &[("Kiwi", 0.4)], &[("weight", Severity::Medium)]);
        let b_recs = recs("2", &[("Kiwi", 0.2), ("Anker", 0.0)], &[]);

        let mut seq = AggregateCounts::default();
        seq.record_document(&a_recs);
        seq.record_document(&b_recs);

        let mut a = AggregateCounts::default();
        a.record_document(&a_recs);
        let mut b = AggregateCounts::default();
        b.record_document(&b_recs);
        a.merge(&b);

        assert_eq!(a, seq);
    }

    #[test]
    fn display_names() {
        assert_eq!(issue_display_name("forehead_discomfort"), "Forehead Discomfort");
        assert_eq!(issue_display_name("weight"), "Weight");
    }
}
