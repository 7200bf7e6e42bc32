// src/records.rs
//! Input documents and the per-document output records.

use std::io::BufRead;

use serde::{Deserialize, Deserializer, Serialize};

use crate::severity::Severity;

/// One review / forum post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "text", alias = "body")]
    pub content: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Title and content joined by a single space.
    pub fn analysis_text(&self) -> String {
        let mut s = String::with_capacity(self.title.len() + 1 + self.content.len());
        s.push_str(&self.title);
        s.push(' ');
        s.push_str(&self.content);
        s
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

fn id_from_string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        S(String),
        I(i64),
        U(u64),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::S(s) => s,
        Raw::I(i) => i.to_string(),
        Raw::U(u) => u.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryMention {
    pub canonical_name: String,
    pub accessory_type: String,
    pub sentiment_score: f64,
    pub context_snippet: String,
    /// Matched fragment before normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComfortIssue {
    pub issue_type: String,
    pub severity: Severity,
    pub context_snippet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecords {
    pub review_id: String,
    pub accessory_mentions: Vec<AccessoryMention>,
    pub comfort_issues: Vec<ComfortIssue>,
}

impl DocumentRecords {
    pub fn empty(review_id: impl Into<String>) -> Self {
        Self {
            review_id: review_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accessory_mentions.is_empty() && self.comfort_issues.is_empty()
    }
}

/// A JSONL line that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub line: usize,
    pub reason: String,
}

/// Reads one `Document` per non-blank line. Bad lines are collected, not fatal.
pub fn read_documents_jsonl<R: BufRead>(
    reader: R,
) -> std::io::Result<(Vec<Document>, Vec<LineError>)> {
    let mut docs = Vec::new();
    let mut errors = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Document>(&line) {
            Ok(d) => docs.push(d),
            Err(e) => errors.push(LineError {
                line: idx + 1,
                reason: e.to_string(),
            }),
        }
    }
    Ok((docs, errors))
}
