//! Word-bounded term matching
//!
//! Hinglish keywords are short ("ex", "kam", "door") and collide with
//! substrings of longer words ("excited", "kaam", "doordarshan"), so every
//! match here must start and end on a word boundary. Multi-word phrases
//! ("mil gaya") match as long as their outer edges are bounded.

use aho_corasick::AhoCorasick;
use hinglish_core::Result;

/// Whether the byte range `[start, end)` of `text` is bounded by non-alphanumeric characters
pub(crate) fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Check whether `term` occurs in `text` as a whole word or phrase.
///
/// ASCII case-insensitive.
pub fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let haystack = text.to_ascii_lowercase();
    let needle = term.to_ascii_lowercase();
    haystack
        .match_indices(needle.as_str())
        .any(|(start, m)| is_word_bounded(&haystack, start, start + m.len()))
}

/// Check whether any of `terms` occurs in `text`
pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| contains_term(text, term))
}

/// A compiled set of terms matched with Aho-Corasick.
///
/// Term order is significant: [`TermSet::first_entry`] returns the lowest
/// term index that matches, independent of where in the text it occurs.
pub struct TermSet {
    matcher: AhoCorasick,
    terms: Vec<String>,
}

impl TermSet {
    /// Build a term set
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&terms)
            .map_err(|e| {
                hinglish_core::Error::classifier(format!("Failed to build term matcher: {}", e))
            })?;

        Ok(Self { matcher, terms })
    }

    /// Indices of every term matching `text` on word boundaries, in text order
    pub fn matching_indices(&self, text: &str) -> Vec<usize> {
        self.matcher
            .find_overlapping_iter(text)
            .filter(|m| is_word_bounded(text, m.start(), m.end()))
            .map(|m| m.pattern().as_usize())
            .collect()
    }

    /// Lowest term index that matches `text`
    pub fn first_entry(&self, text: &str) -> Option<usize> {
        self.matching_indices(text).into_iter().min()
    }

    /// Whether any term matches `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.first_entry(text).is_some()
    }

    /// Number of distinct terms matching `text`
    pub fn count_distinct(&self, text: &str) -> usize {
        let mut indices = self.matching_indices(text);
        indices.sort_unstable();
        indices.dedup();
        indices.len()
    }

    /// Term at `index`
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
