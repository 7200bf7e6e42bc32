//! Accessory name normalization.
//!
//! Several spellings of one product ("bobovr", "bobo m3", "m3 pro") collapse
//! onto one display name. Unknown fragments fall back to title case.

use std::collections::HashMap;

use crate::text::fold;

#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    // folded alias -> display name
    table: HashMap<String, String>,
}

impl NameNormalizer {
    pub fn new(canonical: &HashMap<String, String>) -> Self {
        let table = canonical
            .iter()
            .filter(|(alias, _)| !alias.trim().is_empty())
            .map(|(alias, name)| (fold(alias), name.clone()))
            .collect();
        Self { table }
    }

    pub fn normalize(&self, trigger: &str) -> String {
        match self.table.get(&fold(trigger)) {
            Some(name) => name.clone(),
            None => title_case(trigger),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest.
/// Digits and punctuation start a new run: "m3pro" -> "M3Pro".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
