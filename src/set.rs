//! The deduplicated, sorted list of formatted citations.

use std::collections::BTreeSet;

use serde::Serialize;

/// Formatted citations with duplicates removed, in ascending lexicographic order.
///
/// Duplicates are exact string matches; no whitespace or case folding is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CitationSet {
    entries: Vec<String>,
}

impl CitationSet {
    /// Builds a set from formatted citations (including error markers).
    ///
    /// # Examples
    ///
    /// ```
    /// use toa_extract::CitationSet;
    ///
    /// let set = CitationSet::build(["b", "a", "b"]);
    /// assert_eq!(set.as_slice(), ["a", "b"]);
    /// ```
    pub fn build<I, S>(formatted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = formatted.into_iter().map(Into::into).collect();
        CitationSet {
            entries: unique.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Entries joined by newlines, with no trailing newline.
    pub fn to_text(&self) -> String {
        self.entries.join("\n")
    }
}

impl<S: Into<String>> FromIterator<S> for CitationSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        CitationSet::build(iter)
    }
}
