// src/engine.rs
//! Per-document analysis: extraction, normalization, sentiment and severity
//! glued together over one immutable lexicon.

use crate::config::PipelineConfig;
use crate::extract::{extract_with, CategoryMatch, CategoryTable, ExtractOptions};
use crate::lexicon::Lexicon;
use crate::normalize::NameNormalizer;
use crate::records::{AccessoryMention, ComfortIssue, Document, DocumentRecords};
use crate::sentiment::SentimentScorer;
use crate::severity::SeverityClassifier;

/// Stateless once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ComfortEngine {
    accessories: CategoryTable,
    issues: CategoryTable,
    normalizer: NameNormalizer,
    severity: SeverityClassifier,
    sentiment: SentimentScorer,
    options: ExtractOptions,
}

impl ComfortEngine {
    pub fn new(lexicon: &Lexicon, sentiment: SentimentScorer, config: &PipelineConfig) -> Self {
        Self {
            accessories: lexicon.accessory_table(),
            issues: lexicon.issue_table(),
            normalizer: NameNormalizer::new(&lexicon.canonical),
            severity: SeverityClassifier::new(&lexicon.severity),
            sentiment: sentiment.with_window(config.sentiment_window),
            options: config.extract_options(),
        }
    }

    /// Default pipeline settings and the built-in polarity lexicon.
    pub fn from_lexicon(lexicon: &Lexicon) -> Self {
        Self::new(lexicon, SentimentScorer::default(), &PipelineConfig::default())
    }

    pub fn sentiment(&self) -> &SentimentScorer {
        &self.sentiment
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    pub fn accessory_matches(&self, text: &str) -> Vec<CategoryMatch> {
        extract_with(text, &self.accessories, &self.options)
    }

    pub fn issue_matches(&self, text: &str) -> Vec<CategoryMatch> {
        extract_with(text, &self.issues, &self.options)
    }

    /// One mention per surviving accessory match; sentiment is localized to
    /// the raw trigger, not the canonical name.
    pub fn accessory_mentions(&self, text: &str) -> Vec<AccessoryMention> {
        self.accessory_matches(text)
            .into_iter()
            .map(|m| AccessoryMention {
                canonical_name: self.normalizer.normalize(&m.trigger),
                accessory_type: m.category_id,
                sentiment_score: self.sentiment.score_term_localized(text, &m.trigger),
                context_snippet: m.context,
                trigger: Some(m.trigger),
            })
            .collect()
    }

    pub fn comfort_issues(&self, text: &str) -> Vec<ComfortIssue> {
        self.issue_matches(text)
            .into_iter()
            .map(|m| ComfortIssue {
                severity: self.severity.classify(&m.context),
                issue_type: m.category_id,
                context_snippet: m.context,
            })
            .collect()
    }

    pub fn analyze(&self, doc: &Document) -> DocumentRecords {
        let text = doc.analysis_text();
        DocumentRecords {
            review_id: doc.id.clone(),
            accessory_mentions: self.accessory_mentions(&text),
            comfort_issues: self.comfort_issues(&text),
        }
    }
}
