//! Legal citation recognizer.
//!
//! Finds case citations in plain text, e.g. `Smith v. Jones, 123 F.3d 456, 460 (9th Cir. 1999)`
//! and `123 F.3d at 460`, along with the citation kinds that are not
//! collected into a Table of Authorities (`Id.`, statutes, `supra`).
//!
//! The built-in [`ReporterRecognizer`] knows a fixed list of common
//! reporters. Anything that implements [`Recognizer`] can be used instead.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::citation::{
    CitationMatch, FullCitation, IdCitation, LawCitation, ShortCitation, SupraCitation,
};

/// Errors that can occur during recognition.
#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("document text is {size} bytes, over the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("recognizer failed: {0}")]
    Failed(String),
}

/// Something that can find citations in document text.
pub trait Recognizer {
    /// Returns the citations found in `text`, ordered by position.
    fn recognize(&self, text: &str) -> Result<Vec<CitationMatch>, RecognizeError>;
}

/// Regex-based recognizer for common U.S. reporters.
#[derive(Debug, Clone)]
pub struct ReporterRecognizer {
    max_input_bytes: usize,
}

impl ReporterRecognizer {
    /// Default cap on the amount of text handed to the recognizer.
    pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;

    pub fn new() -> Self {
        ReporterRecognizer {
            max_input_bytes: Self::DEFAULT_MAX_INPUT_BYTES,
        }
    }

    pub fn with_max_input_bytes(max_input_bytes: usize) -> Self {
        ReporterRecognizer { max_input_bytes }
    }
}

impl Default for ReporterRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for ReporterRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<CitationMatch>, RecognizeError> {
        if text.len() > self.max_input_bytes {
            return Err(RecognizeError::InputTooLarge {
                size: text.len(),
                limit: self.max_input_bytes,
            });
        }
        Ok(recognize_citations(text))
    }
}

/// Reporter abbreviations recognized in case citations.
const REPORTERS: &[&str] = &[
    "U.S.",
    "S. Ct.",
    "L. Ed.",
    "L. Ed. 2d",
    "F.",
    "F.2d",
    "F.3d",
    "F.4th",
    "F. Supp.",
    "F. Supp. 2d",
    "F. Supp. 3d",
    "F. App'x",
    "Fed. Cl.",
    "B.R.",
    "A.",
    "A.2d",
    "A.3d",
    "N.E.",
    "N.E.2d",
    "N.E.3d",
    "N.W.",
    "N.W.2d",
    "P.",
    "P.2d",
    "P.3d",
    "S.E.",
    "S.E.2d",
    "S.W.",
    "S.W.2d",
    "S.W.3d",
    "So.",
    "So. 2d",
    "So. 3d",
    "Cal.",
    "Cal. 2d",
    "Cal. 3d",
    "Cal. 4th",
    "Cal. 5th",
    "Cal. Rptr.",
    "Cal. Rptr. 2d",
    "Cal. Rptr. 3d",
    "N.Y.",
    "N.Y.2d",
    "N.Y.3d",
    "N.Y.S.",
    "N.Y.S.2d",
    "N.Y.S.3d",
    "Ill. 2d",
    "Wash. 2d",
    "Mass.",
];

/// Words that may appear inside a party name without being capitalized.
const NAME_CONNECTORS: &[&str] = &["of", "the", "and", "&", "ex", "rel.", "de", "la", "for"];

/// Introductory signals that precede a case name but are not part of it.
const SIGNALS: &[&str] = &[
    "See", "Cf.", "But", "Accord", "Compare", "Contra", "In", "Under", "As", "And", "Also", "also",
];

/// Abbreviations that end in a period but do not end a party name.
const NAME_ABBREVIATIONS: &[&str] = &[
    "Inc.", "Co.", "Corp.", "Ltd.", "Bros.", "Ass'n", "Dep't", "Gov't", "Int'l", "Nat'l", "Bd.",
    "Dist.", "Cnty.", "Ins.", "Mut.", "Sch.", "Univ.", "Comm'n", "Auth.", "Mfg.", "St.", "Mr.",
    "Mrs.", "Dr.", "Jr.", "Sr.",
];

const PIN: &str = r"\d{1,5}(?:[-–]\d{1,5})?";

/// Alternation of all reporters, longest first so `F.3d` wins over `F.`.
fn reporter_pattern() -> String {
    let mut reporters: Vec<&str> = REPORTERS.to_vec();
    reporters.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    reporters
        .iter()
        .map(|r| {
            regex::escape(r)
                .replace(' ', r"\s+")
                .replace('\'', "['’]")
        })
        .collect::<Vec<_>>()
        .join("|")
}

static FULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<volume>\d{{1,4}})\s+(?P<reporter>{reporters})\s+(?P<page>\d{{1,5}})\b(?:,\s*(?P<pin>{pin})\b)?(?:\s*\((?P<court>[^()]{{0,60}}?)\s*(?P<year>\d{{4}})\))?",
        reporters = reporter_pattern(),
        pin = PIN,
    ))
    .expect("full citation pattern is valid")
});

static PARALLEL_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\d{{1,4}}\s+(?:{reporters})\s+\d",
        reporters = reporter_pattern()
    ))
    .expect("parallel citation pattern is valid")
});

static SHORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<volume>\d{{1,4}})\s+(?P<reporter>{reporters}),?\s+at\s+(?P<pin>{pin})",
        reporters = reporter_pattern(),
        pin = PIN,
    ))
    .expect("short citation pattern is valid")
});

static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<id>[Ii]d\.|[Ii]bid\.)(?:,?\s+at\s+(?P<pin>{pin}))?",
        pin = PIN
    ))
    .expect("id citation pattern is valid")
});

static LAW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<title>\d{1,3})\s+(?P<code>U\.S\.C\.A?|C\.F\.R\.)\s*§§?\s*(?P<section>\d[\w.\-–]*(?:\(\w+\))*)",
    )
    .expect("law citation pattern is valid")
});

static SUPRA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<antecedent>[A-Z][\w'’\-]*),?\s+supra\b(?:,?\s+at\s+(?P<pin>{pin}))?",
        pin = PIN
    ))
    .expect("supra citation pattern is valid")
});

/// Finds every citation in `text`, ordered by position.
///
/// When two candidate matches overlap, the one that starts first wins (the
/// longer one if they start at the same byte).
///
/// # Examples
///
/// ```
/// use toa_extract::{recognize_citations, CitationMatch};
///
/// let found = recognize_citations("See Smith v. Jones, 123 F.3d 456, 460 (1999).");
/// assert_eq!(found.len(), 1);
/// match &found[0] {
///     CitationMatch::Full(full) => {
///         assert_eq!(full.plaintiff.as_deref(), Some("Smith"));
///         assert_eq!(full.matched_text, "123 F.3d 456");
///     }
///     other => panic!("unexpected match: {:?}", other),
/// }
/// ```
pub fn recognize_citations(text: &str) -> Vec<CitationMatch> {
    let mut candidates: Vec<CitationMatch> = Vec::new();
    candidates.extend(find_full_citations(text));
    candidates.extend(find_short_citations(text));
    candidates.extend(find_id_citations(text));
    candidates.extend(find_law_citations(text));
    candidates.extend(find_supra_citations(text));

    candidates.sort_by(|a, b| {
        let (a_start, a_end) = a.span();
        let (b_start, b_end) = b.span();
        a_start.cmp(&b_start).then(b_end.cmp(&a_end))
    });

    let mut citations: Vec<CitationMatch> = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for candidate in candidates {
        let (start, end) = candidate.span();
        if !citations.is_empty() && start < last_end {
            continue;
        }
        citations.push(candidate);
        last_end = end;
    }

    // Party names may only come from text between the previous citation and this one.
    let mut prev_end = 0;
    for citation in &mut citations {
        let (start, end) = citation.span();
        if let CitationMatch::Full(full) = citation {
            if let Some((plaintiff, defendant)) = extract_parties(&text[prev_end..start]) {
                full.plaintiff = Some(plaintiff);
                full.defendant = Some(defendant);
            }
        }
        prev_end = end;
    }

    citations
}

fn find_full_citations(text: &str) -> Vec<CitationMatch> {
    let mut found: Vec<FullCitation> = Vec::new();
    // Index of the first member of an unfinished parallel group.
    let mut group_start: Option<usize> = None;
    let mut pos = 0;

    while pos < text.len() {
        let Some(cap) = FULL_RE.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = cap.get(0) else {
            break;
        };
        let (Some(volume), Some(page)) = (cap.name("volume"), cap.name("page")) else {
            break;
        };

        let mut citation = FullCitation {
            matched_text: text[volume.start()..page.end()].to_string(),
            span: (whole.start(), whole.end()),
            ..Default::default()
        };

        // In `1 U.S. 1, 2 S. Ct. 3` the second citation is parallel, not a pin cite.
        let parallel = cap
            .name("pin")
            .is_some_and(|pin| PARALLEL_START_RE.is_match(&text[pin.start()..]));

        if parallel {
            citation.span = (whole.start(), page.end());
            group_start.get_or_insert(found.len());
        } else {
            citation.pin_cite = group(&cap, "pin");
            citation.year = group(&cap, "year");
            citation.court = cap
                .name("court")
                .map(|m| m.as_str().trim().trim_end_matches(',').trim().to_string())
                .filter(|s| !s.is_empty());

            // The closing parenthetical belongs to every reporter of the group.
            if let Some(first) = group_start.take() {
                for earlier in &mut found[first..] {
                    earlier.year = citation.year.clone();
                    earlier.court = citation.court.clone();
                }
            }
        }

        pos = citation.span.1;
        found.push(citation);
    }

    found.into_iter().map(CitationMatch::Full).collect()
}

fn find_short_citations(text: &str) -> Vec<CitationMatch> {
    SHORT_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let volume = cap.name("volume")?;
            let reporter = cap.name("reporter")?;
            Some(CitationMatch::Short(ShortCitation {
                pin_cite: group(&cap, "pin"),
                matched_text: text[volume.start()..reporter.end()].to_string(),
                span: (whole.start(), whole.end()),
            }))
        })
        .collect()
}

fn find_id_citations(text: &str) -> Vec<CitationMatch> {
    ID_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            Some(CitationMatch::Id(IdCitation {
                pin_cite: group(&cap, "pin"),
                matched_text: whole.as_str().to_string(),
                span: (whole.start(), whole.end()),
            }))
        })
        .collect()
}

fn find_law_citations(text: &str) -> Vec<CitationMatch> {
    LAW_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let section_match = cap.name("section")?;
            // A sentence-ending period is not part of the section number.
            let section = section_match.as_str().trim_end_matches('.');
            let end = section_match.start() + section.len();
            Some(CitationMatch::Law(LawCitation {
                title: group(&cap, "title")?,
                code: group(&cap, "code")?,
                section: section.to_string(),
                matched_text: text[whole.start()..end].to_string(),
                span: (whole.start(), end),
            }))
        })
        .collect()
}

fn find_supra_citations(text: &str) -> Vec<CitationMatch> {
    SUPRA_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            Some(CitationMatch::Supra(SupraCitation {
                antecedent: group(&cap, "antecedent")?,
                pin_cite: group(&cap, "pin"),
                matched_text: whole.as_str().to_string(),
                span: (whole.start(), whole.end()),
            }))
        })
        .collect()
}

fn group(cap: &Captures<'_>, name: &str) -> Option<String> {
    cap.name(name).map(|m| m.as_str().to_string())
}

/// Extracts `(plaintiff, defendant)` from the text just before a reporter citation.
///
/// The text must end with `<plaintiff> v. <defendant>,`.
fn extract_parties(before: &str) -> Option<(String, String)> {
    let before = before.trim_end().strip_suffix(',')?;

    let (idx, sep_len) = [" v. ", " vs. ", " v ", " V. "]
        .iter()
        .filter_map(|sep| before.rfind(sep).map(|i| (i, sep.len())))
        .max_by_key(|(i, _)| *i)?;

    let defendant = before[idx + sep_len..].trim();
    let plaintiff = plaintiff_from(&before[..idx])?;

    let starts_upper = defendant
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
    if !starts_upper
        || defendant.contains([';', ':', '(', ')'])
        || defendant.split_whitespace().count() > 8
    {
        return None;
    }

    Some((plaintiff, defendant.to_string()))
}

/// Walks backwards from the `v.` collecting the words of the plaintiff's name.
fn plaintiff_from(before_v: &str) -> Option<String> {
    let mut words: Vec<&str> = Vec::new();

    for word in before_v.split_whitespace().rev() {
        if word.ends_with([',', ';', ':', '(', ')']) || word.contains(['(', ')']) {
            break;
        }
        let capitalized = word
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
        if !capitalized && !NAME_CONNECTORS.contains(&word) {
            break;
        }
        if word.ends_with('.') && !is_name_abbreviation(word) {
            break;
        }
        words.push(word);
        if words.len() == 6 {
            break;
        }
    }
    words.reverse();

    // Drop leading signals and dangling connectors.
    let first = words
        .iter()
        .position(|w| !SIGNALS.contains(w) && !NAME_CONNECTORS.contains(w))?;
    let name = words[first..].join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn is_name_abbreviation(word: &str) -> bool {
    let normalized = word.replace('’', "'");
    NAME_ABBREVIATIONS.contains(&normalized.as_str())
        || word[..word.len() - 1].contains('.')
        || word.chars().count() <= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_full(text: &str) -> FullCitation {
        let found = recognize_citations(text);
        assert_eq!(found.len(), 1, "expected exactly one citation in {:?}: {:?}", text, found);
        match found.into_iter().next() {
            Some(CitationMatch::Full(full)) => full,
            other => panic!("expected a full citation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text() {
        assert!(recognize_citations("").is_empty());
    }

    #[test]
    fn test_no_citations() {
        assert!(recognize_citations("The parties agree on the facts.").is_empty());
    }

    #[test]
    fn test_full_citation_with_parties_pin_and_year() {
        let full = only_full("Smith v. Jones, 123 F.3d 456, 460 (1999).");
        assert_eq!(full.plaintiff.as_deref(), Some("Smith"));
        assert_eq!(full.defendant.as_deref(), Some("Jones"));
        assert_eq!(full.matched_text, "123 F.3d 456");
        assert_eq!(full.pin_cite.as_deref(), Some("460"));
        assert_eq!(full.year.as_deref(), Some("1999"));
        assert_eq!(full.court, None);
    }

    #[test]
    fn test_full_citation_with_court_parenthetical() {
        let full = only_full("Doe v. Roe, 12 F. Supp. 2d 34 (S.D.N.Y. 2001)");
        assert_eq!(full.matched_text, "12 F. Supp. 2d 34");
        assert_eq!(full.court.as_deref(), Some("S.D.N.Y."));
        assert_eq!(full.year.as_deref(), Some("2001"));
    }

    #[test]
    fn test_full_citation_without_parties() {
        let full = only_full("The rule appears in 410 U.S. 113.");
        assert_eq!(full.plaintiff, None);
        assert_eq!(full.defendant, None);
        assert_eq!(full.matched_text, "410 U.S. 113");
    }

    #[test]
    fn test_signal_is_not_part_of_plaintiff() {
        let full = only_full("See Brown v. Board of Education, 347 U.S. 483 (1954).");
        assert_eq!(full.plaintiff.as_deref(), Some("Brown"));
        assert_eq!(full.defendant.as_deref(), Some("Board of Education"));
    }

    #[test]
    fn test_multiword_parties_with_abbreviations() {
        let full = only_full("In Acme Co. v. United States, 5 F.4th 10, 12-14 (Fed. Cir. 2021)");
        assert_eq!(full.plaintiff.as_deref(), Some("Acme Co."));
        assert_eq!(full.defendant.as_deref(), Some("United States"));
        assert_eq!(full.pin_cite.as_deref(), Some("12-14"));
        assert_eq!(full.court.as_deref(), Some("Fed. Cir."));
    }

    #[test]
    fn test_longest_reporter_wins() {
        let full = only_full("1 F.2d 2");
        assert_eq!(full.matched_text, "1 F.2d 2");
    }

    #[test]
    fn test_parallel_citation_is_not_a_pin_cite() {
        let found = recognize_citations("Roe v. Wade, 410 U.S. 113, 93 S. Ct. 705 (1973)");
        assert_eq!(found.len(), 2);
        match &found[0] {
            CitationMatch::Full(full) => {
                assert_eq!(full.matched_text, "410 U.S. 113");
                assert_eq!(full.pin_cite, None);
                assert_eq!(full.plaintiff.as_deref(), Some("Roe"));
                assert_eq!(full.year.as_deref(), Some("1973"));
            }
            other => panic!("unexpected {:?}", other),
        }
        match &found[1] {
            CitationMatch::Full(full) => {
                assert_eq!(full.matched_text, "93 S. Ct. 705");
                assert_eq!(full.year.as_deref(), Some("1973"));
                assert_eq!(full.plaintiff, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parallel_group_shares_closing_parenthetical() {
        let found = recognize_citations(
            "Roe v. Wade, 410 U.S. 113, 93 S. Ct. 705, 35 L. Ed. 2d 147 (U.S. 1973); later, 1 F.3d 2 (1990).",
        );
        let fulls: Vec<&FullCitation> = found
            .iter()
            .filter_map(|m| match m {
                CitationMatch::Full(full) => Some(full),
                _ => None,
            })
            .collect();

        assert_eq!(fulls.len(), 4);
        for full in &fulls[..3] {
            assert_eq!(full.year.as_deref(), Some("1973"), "{}", full.matched_text);
            assert_eq!(full.court.as_deref(), Some("U.S."), "{}", full.matched_text);
        }
        assert_eq!(fulls[1].matched_text, "93 S. Ct. 705");
        assert_eq!(fulls[3].year.as_deref(), Some("1990"));
        assert_eq!(fulls[3].court, None);
    }

    #[test]
    fn test_short_citation() {
        let found = recognize_citations("Later, 123 F.3d at 460, the court said more.");
        assert_eq!(
            found,
            vec![CitationMatch::Short(ShortCitation {
                pin_cite: Some("460".to_string()),
                matched_text: "123 F.3d".to_string(),
                span: (7, 22),
            })]
        );
    }

    #[test]
    fn test_id_law_and_supra_kinds() {
        let text = "Id. at 5. See 42 U.S.C. § 1983. Smith, supra, at 7.";
        let kinds: Vec<&str> = recognize_citations(text).iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec!["id", "law", "supra"]);
    }

    #[test]
    fn test_law_section_drops_sentence_period() {
        let found = recognize_citations("under 42 U.S.C. § 1983.");
        match &found[0] {
            CitationMatch::Law(law) => {
                assert_eq!(law.section, "1983");
                assert_eq!(law.matched_text, "42 U.S.C. § 1983");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_said_is_not_an_id_citation() {
        assert!(recognize_citations("The court said.").is_empty());
    }

    #[test]
    fn test_parties_do_not_leak_across_citations() {
        let text = "Smith v. Jones, 1 U.S. 1 (1800); 2 U.S. 2 (1801).";
        let found = recognize_citations(text);
        assert_eq!(found.len(), 2);
        match &found[1] {
            CitationMatch::Full(full) => assert_eq!(full.plaintiff, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_results_ordered_by_position() {
        let text = "Id. 3 U.S. 3. 4 U.S. at 5.";
        let starts: Vec<usize> = recognize_citations(text).iter().map(|c| c.span().0).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(starts.len(), 3);
    }

    #[test]
    fn test_recognizer_rejects_oversized_input() {
        let recognizer = ReporterRecognizer::with_max_input_bytes(4);
        let err = recognizer.recognize("Id. at 12").unwrap_err();
        assert!(matches!(err, RecognizeError::InputTooLarge { size: 9, limit: 4 }));
    }

    #[test]
    fn test_recognizer_trait_delegates() {
        let recognizer = ReporterRecognizer::default();
        let found = recognizer.recognize("1 U.S. 1").unwrap();
        assert_eq!(found.len(), 1);
    }
}
