//! Case-folding helpers shared by the extractor, severity classifier and
//! sentiment scorer.
//!
//! All window arithmetic in this crate is done in *characters*, not bytes.
//! `FoldedText` keeps a lowercased copy of a document together with the byte
//! offset of every character in both copies, so a hit found in the folded
//! text can be mapped back onto the original one.

/// Lowercase a single char, keeping it unchanged when its lowercase form is
/// longer than one char (so folded and original stay char-for-char aligned).
#[inline]
pub fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Char-aligned lowercase copy of `s`.
pub fn fold(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Return at most the first `max` chars of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((b, _)) => &s[..b],
        None => s,
    }
}

/// A document plus its folded twin and per-char byte offsets for both.
#[derive(Debug)]
pub struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    // byte offset of each char, plus a trailing entry for the total length
    orig_bounds: Vec<usize>,
    fold_bounds: Vec<usize>,
}

impl<'a> FoldedText<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut orig_bounds = Vec::with_capacity(original.len() + 1);
        let mut fold_bounds = Vec::with_capacity(original.len() + 1);

        for (b, c) in original.char_indices() {
            orig_bounds.push(b);
            fold_bounds.push(folded.len());
            folded.push(fold_char(c));
        }
        orig_bounds.push(original.len());
        fold_bounds.push(folded.len());

        Self {
            original,
            folded,
            orig_bounds,
            fold_bounds,
        }
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Number of chars in the document.
    pub fn char_len(&self) -> usize {
        self.orig_bounds.len() - 1
    }

    /// Map a byte offset inside the folded text to a char index.
    /// Offsets produced by `str::find` / regex matches always land on a char
    /// boundary; anything else rounds up to the next char.
    pub fn char_at(&self, folded_byte: usize) -> usize {
        match self.fold_bounds.binary_search(&folded_byte) {
            Ok(i) => i,
            Err(i) => i.min(self.char_len()),
        }
    }

    /// Slice of the original text between two char indices.
    pub fn original_slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.char_len());
        let start = start.min(end);
        &self.original[self.orig_bounds[start]..self.orig_bounds[end]]
    }

    /// Original text from `radius` chars before `start` to `radius` chars
    /// after `end`, clamped to the document bounds. Not trimmed.
    pub fn window(&self, start: usize, end: usize, radius: usize) -> &'a str {
        let lo = start.saturating_sub(radius);
        let hi = end.saturating_add(radius).min(self.char_len());
        self.original_slice(lo, hi)
    }

    /// Char spans of every occurrence of an already-folded `needle`,
    /// overlapping occurrences included. Empty needles never match.
    pub fn occurrences(&self, needle: &str) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let Some(first) = needle.chars().next() else {
            return out;
        };

        let mut from = 0usize;
        while let Some(rel) = self.folded[from..].find(needle) {
            let b = from + rel;
            out.push((self.char_at(b), self.char_at(b + needle.len())));
            from = b + first.len_utf8();
        }
        out
    }
}
