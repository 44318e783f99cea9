//! Document → citation set.
//!
//! Extracts the text of a document, recognizes citations, keeps the case
//! citations, formats them and collapses the result into a [`CitationSet`].

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::citation::CitationMatch;
use crate::docx::{self, DocxError};
use crate::formatter::format_citation;
use crate::recognizer::{RecognizeError, Recognizer};
use crate::set::CitationSet;

/// Errors that can occur while loading a document.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read document: {0}")]
    Extract(#[from] DocxError),

    #[error("cannot recognize citations: {0}")]
    Recognize(#[from] RecognizeError),
}

/// Counts describing one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Citations of any kind found in the text
    pub recognized: usize,
    /// Citations dropped because they are not case citations (`Id.`, statutes, `supra`)
    pub filtered: usize,
    /// Case citations that could not be formatted and appear as error markers
    pub format_errors: usize,
    /// Distinct entries in the resulting set
    pub entries: usize,
}

/// Formats each case citation in `matches` and builds the set.
///
/// Citations that fail to format are kept as `[Formatting error: ...]` markers.
pub fn build_citation_set(matches: Vec<CitationMatch>) -> (CitationSet, LoadReport) {
    let mut report = LoadReport {
        recognized: matches.len(),
        ..Default::default()
    };

    let mut formatted: Vec<String> = Vec::with_capacity(matches.len());
    for citation in matches {
        let kind = citation.kind();
        let Some(case) = citation.into_case() else {
            tracing::debug!(kind, "skipping non-case citation");
            report.filtered += 1;
            continue;
        };
        match format_citation(&case) {
            Ok(text) => formatted.push(text),
            Err(e) => {
                tracing::warn!(matched = case.matched_text(), error = %e, "citation degraded to error marker");
                report.format_errors += 1;
                formatted.push(e.marker());
            }
        }
    }

    let set = CitationSet::build(formatted);
    report.entries = set.len();
    (set, report)
}

/// Recognizes citations in `text` and builds the set.
pub fn citations_from_text(
    text: &str,
    recognizer: &dyn Recognizer,
) -> Result<(CitationSet, LoadReport), RecognizeError> {
    let matches = recognizer.recognize(text)?;
    Ok(build_citation_set(matches))
}

/// Runs the whole pipeline for the document at `path`.
pub fn load_document(
    path: &Path,
    recognizer: &dyn Recognizer,
) -> Result<(CitationSet, LoadReport), LoadError> {
    let text = docx::extract_text(path)?;
    let (set, report) = citations_from_text(&text, recognizer)?;
    tracing::info!(
        path = %path.display(),
        recognized = report.recognized,
        filtered = report.filtered,
        format_errors = report.format_errors,
        entries = report.entries,
        "loaded document"
    );
    Ok((set, report))
}
