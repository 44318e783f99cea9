//! Case citation formatting.
//!
//! Turns a [`CaseCitation`] into the display string used in the Table of
//! Authorities:
//!
//! - Full: `<case name>, <matched>[, <pin cite>][ (<year>)]`
//! - Short: `<matched>[ at <pin cite>]`

use crate::citation::{CaseCitation, FullCitation, ShortCitation};
use thiserror::Error;

/// Errors that can occur while formatting a single citation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("citation has no matched text")]
    EmptyMatchedText,
}

impl FormatError {
    /// The inline marker that stands in for a citation that could not be formatted.
    ///
    /// A table keeps the marker in place of the citation, so one malformed
    /// citation never aborts the whole batch.
    pub fn marker(&self) -> String {
        format!("[Formatting error: {}]", self)
    }
}

/// Formats a case citation.
///
/// # Examples
///
/// ```
/// use toa_extract::{format_citation, CaseCitation, ShortCitation};
///
/// let short = CaseCitation::Short(ShortCitation {
///     matched_text: "Id.".to_string(),
///     pin_cite: Some("12".to_string()),
///     span: (0, 3),
/// });
/// assert_eq!(format_citation(&short).unwrap(), "Id. at 12");
/// ```
pub fn format_citation(citation: &CaseCitation) -> Result<String, FormatError> {
    match citation {
        CaseCitation::Full(full) => format_full(full),
        CaseCitation::Short(short) => format_short(short),
    }
}

fn format_full(full: &FullCitation) -> Result<String, FormatError> {
    let matched = matched_text(&full.matched_text)?;

    let case_name = match (non_empty(&full.plaintiff), non_empty(&full.defendant)) {
        (Some(plaintiff), Some(defendant)) => format!("{} v. {}", plaintiff, defendant),
        _ => matched.to_string(),
    };

    let mut out = format!("{}, {}", case_name, matched);
    if let Some(pin) = non_empty(&full.pin_cite) {
        out.push_str(", ");
        out.push_str(pin);
    }
    if let Some(year) = non_empty(&full.year) {
        out.push_str(" (");
        out.push_str(year);
        out.push(')');
    }

    Ok(out)
}

fn format_short(short: &ShortCitation) -> Result<String, FormatError> {
    let matched = matched_text(&short.matched_text)?;

    Ok(match non_empty(&short.pin_cite) {
        Some(pin) => format!("{} at {}", matched, pin),
        None => matched.to_string(),
    })
}

fn matched_text(text: &str) -> Result<&str, FormatError> {
    if text.trim().is_empty() {
        return Err(FormatError::EmptyMatchedText);
    }
    Ok(text)
}

/// An empty field is treated the same as a missing one.
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
