//! Lexicon tables: accessory patterns, comfort-issue keywords/regexes,
//! severity tiers, canonical accessory names and known remedies.
//!
//! The lexicon is loaded once (TOML) and never mutated. Components get the
//! pieces they need handed to them explicitly, so tests can swap in small
//! hand-written lexicons.
//!
//! Resolution order for `Lexicon::load_default()`:
//! 1) `$COMFORT_LEXICON_PATH` (must exist)
//! 2) `config/lexicon.toml`
//! 3) the copy embedded at build time

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::extract::{CategorySpec, CategoryTable};

pub const DEFAULT_LEXICON_PATH: &str = "config/lexicon.toml";
pub const ENV_LEXICON_PATH: &str = "COMFORT_LEXICON_PATH";

const BUILTIN_LEXICON: &str = include_str!("../config/lexicon.toml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessoryCategory {
    #[serde(rename = "type")]
    pub accessory_type: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssueCategory {
    #[serde(rename = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regex sources (`regex` crate syntax).
    #[serde(default, rename = "patterns")]
    pub regexes: Vec<String>,
    #[serde(default)]
    pub solutions: Vec<String>,
}

/// Indicator phrases per tier; scanned high -> medium -> low.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeverityTiers {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Lexicon {
    #[serde(default)]
    pub accessories: Vec<AccessoryCategory>,
    #[serde(default)]
    pub issues: Vec<IssueCategory>,
    #[serde(default)]
    pub severity: SeverityTiers,
    /// Raw matched fragment -> display name.
    #[serde(default)]
    pub canonical: HashMap<String, String>,
}

impl Lexicon {
    /// The lexicon shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_LEXICON).context("parsing built-in lexicon")
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let lex: Lexicon = toml::from_str(s)?;
        lex.validate()?;
        Ok(lex)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing lexicon {}", path.display()))
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_LEXICON_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_LEXICON_PATH} points to non-existent path"));
            }
            info!(target: "lexicon", path = %pb.display(), "loading lexicon from env path");
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_LEXICON_PATH);
        if default.exists() {
            info!(target: "lexicon", path = %default.display(), "loading lexicon");
            return Self::load_from(&default);
        }
        info!(target: "lexicon", "using built-in lexicon");
        Self::builtin()
    }

    /// Structural checks: non-empty, unique category ids per table.
    fn validate(&self) -> std::result::Result<(), EngineError> {
        let mut ids = HashSet::new();
        for a in &self.accessories {
            if a.accessory_type.trim().is_empty() {
                return Err(EngineError::Lexicon("accessory category without type".into()));
            }
            if !ids.insert(a.accessory_type.as_str()) {
                return Err(EngineError::Lexicon(format!(
                    "duplicate accessory type '{}'",
                    a.accessory_type
                )));
            }
        }

        ids.clear();
        for i in &self.issues {
            if i.issue_type.trim().is_empty() {
                return Err(EngineError::Lexicon("issue category without type".into()));
            }
            if !ids.insert(i.issue_type.as_str()) {
                return Err(EngineError::Lexicon(format!(
                    "duplicate issue type '{}'",
                    i.issue_type
                )));
            }
        }
        Ok(())
    }

    /// Accessory patterns are plain keywords.
    pub fn accessory_specs(&self) -> Vec<CategorySpec> {
        self.accessories
            .iter()
            .map(|a| CategorySpec::new(&a.accessory_type).keywords(a.patterns.iter().cloned()))
            .collect()
    }

    pub fn issue_specs(&self) -> Vec<CategorySpec> {
        self.issues
            .iter()
            .map(|i| {
                CategorySpec::new(&i.issue_type)
                    .keywords(i.keywords.iter().cloned())
                    .regexes(i.regexes.iter().cloned())
            })
            .collect()
    }

    pub fn accessory_table(&self) -> CategoryTable {
        CategoryTable::compile_lenient(self.accessory_specs())
    }

    pub fn issue_table(&self) -> CategoryTable {
        CategoryTable::compile_lenient(self.issue_specs())
    }

    pub fn issue_types(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.issue_type.as_str())
    }

    pub fn solutions_for(&self, issue_type: &str) -> Option<&[String]> {
        self.issues
            .iter()
            .find(|i| i.issue_type == issue_type)
            .map(|i| i.solutions.as_slice())
    }
}
