//! # Match Extractor
//! Scans one document against a compiled category table and returns
//! context-windowed matches, deduplicated within the document.
//!
//! Order of emission: table order, then pattern order (keywords before
//! regexes), then position in the document. Callers should only rely on set
//! membership and on per-document `dedup_key` uniqueness.

use std::collections::HashSet;

use metrics::counter;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

use crate::error::EngineError;
use crate::text::{fold, truncate_chars, FoldedText};

/// Chars of context kept on each side of a hit.
pub const DEFAULT_CONTEXT_RADIUS: usize = 100;
/// Chars of the snippet that take part in the dedup key.
pub const DEFAULT_DEDUP_PREFIX: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub context_radius: usize,
    pub dedup_prefix: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            dedup_prefix: DEFAULT_DEDUP_PREFIX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Keyword,
    Regex,
}

/// One compiled pattern of a category.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain substring; `text` as configured, `folded` used for searching.
    Keyword { text: String, folded: String },
    /// Case-insensitive regex evaluated over the folded document.
    Regex(Regex),
}

impl Pattern {
    /// Whitespace-only keywords are rejected; anything else is kept as
    /// written, so `" fan "` only matches with a space on both sides.
    pub fn keyword(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Pattern::Keyword {
            text: text.to_string(),
            folded: fold(text),
        })
    }

    pub fn regex(category: &str, source: &str) -> Result<Self, EngineError> {
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map(Pattern::Regex)
            .map_err(|e| EngineError::InvalidPattern {
                category: category.to_string(),
                pattern: source.to_string(),
                source: e,
            })
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Keyword { .. } => PatternKind::Keyword,
            Pattern::Regex(_) => PatternKind::Regex,
        }
    }

    /// Every hit of this pattern in `doc`.
    fn candidates<'c>(
        &self,
        category_id: &'c str,
        doc: &FoldedText<'_>,
    ) -> Vec<MatchCandidate<'c>> {
        match self {
            Pattern::Keyword { text, folded } => doc
                .occurrences(folded)
                .into_iter()
                .map(|(start, end)| MatchCandidate {
                    category_id,
                    trigger: text.clone(),
                    start,
                    end,
                })
                .collect(),
            Pattern::Regex(re) => re
                .find_iter(doc.folded())
                .filter(|m| !m.is_empty())
                .map(|m| MatchCandidate {
                    category_id,
                    trigger: m.as_str().to_string(),
                    start: doc.char_at(m.start()),
                    end: doc.char_at(m.end()),
                })
                .collect(),
        }
    }
}

/// Raw material for one category: id + keyword sources + regex sources.
#[derive(Debug, Clone, Default)]
pub struct CategorySpec {
    pub id: String,
    pub keywords: Vec<String>,
    pub regexes: Vec<String>,
}

impl CategorySpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn keywords<I, S>(mut self, kws: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(kws.into_iter().map(Into::into));
        self
    }

    pub fn regexes<I, S>(mut self, res: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regexes.extend(res.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub patterns: Vec<Pattern>,
}

/// Immutable, compiled category table.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Compile all specs. Patterns that fail to compile are left out and
    /// returned alongside the table; the rest of the table is unaffected.
    pub fn compile<I>(specs: I) -> (Self, Vec<EngineError>)
    where
        I: IntoIterator<Item = CategorySpec>,
    {
        let mut categories = Vec::new();
        let mut errors = Vec::new();

        for spec in specs {
            let mut patterns: Vec<Pattern> =
                spec.keywords.iter().filter_map(|k| Pattern::keyword(k)).collect();

            for src in &spec.regexes {
                match Pattern::regex(&spec.id, src) {
                    Ok(p) => patterns.push(p),
                    Err(e) => errors.push(e),
                }
            }

            categories.push(Category {
                id: spec.id,
                patterns,
            });
        }

        (Self { categories }, errors)
    }

    /// Like `compile`, but logs and counts skipped patterns instead of
    /// returning them.
    pub fn compile_lenient<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = CategorySpec>,
    {
        let (table, errors) = Self::compile(specs);
        for e in &errors {
            warn!(target: "lexicon", error = %e, "skipping pattern");
        }
        if !errors.is_empty() {
            counter!("lexicon_patterns_skipped_total").increment(errors.len() as u64);
        }
        table
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn pattern_count(&self) -> usize {
        self.categories.iter().map(|c| c.patterns.len()).sum()
    }
}

/// A hit before windowing/dedup. Offsets are char indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate<'c> {
    pub category_id: &'c str,
    pub trigger: String,
    pub start: usize,
    pub end: usize,
}

/// Trimmed context around a candidate plus its dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub snippet: String,
    pub dedup_key: String,
}

impl ContextWindow {
    pub fn around(doc: &FoldedText<'_>, cand: &MatchCandidate<'_>, opts: &ExtractOptions) -> Self {
        let snippet = doc
            .window(cand.start, cand.end, opts.context_radius)
            .trim()
            .to_string();
        let dedup_key = format!(
            "{}:{}",
            cand.category_id,
            truncate_chars(&snippet, opts.dedup_prefix)
        );
        Self { snippet, dedup_key }
    }
}

/// One surviving match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMatch {
    pub category_id: String,
    pub context: String,
    pub trigger: String,
    pub kind: PatternKind,
    #[serde(skip)]
    pub dedup_key: String,
}

/// Extract with default window sizes (100 chars context, 50 chars dedup prefix).
pub fn extract(text: &str, table: &CategoryTable) -> Vec<CategoryMatch> {
    extract_with(text, table, &ExtractOptions::default())
}

pub fn extract_with(
    text: &str,
    table: &CategoryTable,
    opts: &ExtractOptions,
) -> Vec<CategoryMatch> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let doc = FoldedText::new(text);
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for cat in table.categories() {
        for pattern in &cat.patterns {
            for cand in pattern.candidates(&cat.id, &doc) {
                let window = ContextWindow::around(&doc, &cand, opts);
                if !seen.insert(window.dedup_key.clone()) {
                    continue;
                }
                out.push(CategoryMatch {
                    category_id: cat.id.clone(),
                    context: window.snippet,
                    trigger: cand.trigger,
                    kind: pattern.kind(),
                    dedup_key: window.dedup_key,
                });
            }
        }
    }

    out
}
