//! # Severity Classifier
//! Maps a context snippet to a severity tier by first-matching indicator.
//!
//! Tiers are scanned high -> medium -> low and, inside a tier, in lexicon
//! order; the first phrase contained in the context (case-insensitive) wins.
//! No indicator at all means `Medium`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexicon::SeverityTiers;
use crate::text::fold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeverityClassifier {
    // (tier, folded phrases) in scan order
    tiers: Vec<(Severity, Vec<String>)>,
}

impl SeverityClassifier {
    pub fn new(tiers: &SeverityTiers) -> Self {
        let prep = |v: &[String]| -> Vec<String> {
            v.iter()
                .map(|p| fold(p))
                .filter(|p| !p.is_empty())
                .collect()
        };
        Self {
            tiers: vec![
                (Severity::High, prep(&tiers.high)),
                (Severity::Medium, prep(&tiers.medium)),
                (Severity::Low, prep(&tiers.low)),
            ],
        }
    }

    pub fn classify(&self, context: &str) -> Severity {
        self.classify_with_indicator(context).0
    }

    /// Severity plus the indicator that decided it (`None` = default).
    pub fn classify_with_indicator(&self, context: &str) -> (Severity, Option<&str>) {
        let text = fold(context);
        for (severity, phrases) in &self.tiers {
            if let Some(p) = phrases.iter().find(|p| text.contains(p.as_str())) {
                return (*severity, Some(p.as_str()));
            }
        }
        (Severity::Medium, None)
    }
}
