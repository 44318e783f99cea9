//! toa-extract: build a Table of Authorities from the case citations in a Word document.
//!
//! This library provides functionality to:
//! - Extract paragraph text from `.docx` packages
//! - Recognize legal citations and keep the case citations
//! - Format, deduplicate and sort them into a citation set
//! - Write the set to a text file, a new document, a copy of the original
//!   document, or the clipboard

pub mod citation;
pub mod controller;
pub mod docx;
pub mod formatter;
pub mod output;
pub mod pipeline;
pub mod recognizer;
pub mod set;

pub use citation::{
    CaseCitation, CitationMatch, FullCitation, IdCitation, LawCitation, ShortCitation,
    SupraCitation,
};
pub use controller::{ActionOutcome, Controller};
pub use docx::{extract_text, DocxError, TableOptions};
pub use formatter::{format_citation, FormatError};
pub use output::{Clipboard, ExportError, SystemClipboard};
pub use pipeline::{build_citation_set, load_document, LoadError, LoadReport};
pub use recognizer::{recognize_citations, RecognizeError, Recognizer, ReporterRecognizer};
pub use set::CitationSet;
