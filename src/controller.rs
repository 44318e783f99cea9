//! Application state and user actions.
//!
//! The [`Controller`] owns the citations of the most recently loaded document
//! and the path they came from. Every action reads that state; only a
//! successful [`Controller::load`] replaces it.

use std::path::{Path, PathBuf};

use crate::docx::TableOptions;
use crate::output::{self, Clipboard, ExportError};
use crate::pipeline::{self, LoadError, LoadReport};
use crate::recognizer::{Recognizer, ReporterRecognizer};
use crate::set::CitationSet;

/// What an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A file was written at this path
    Written(PathBuf),
    /// The table was placed on the clipboard
    Copied { entries: usize },
    /// There was nothing to act on; the notice says why
    NothingToDo(&'static str),
}

#[derive(Debug, Clone)]
struct LoadedDocument {
    source: PathBuf,
    citations: CitationSet,
}

/// Holds the current citation set and runs actions against it.
pub struct Controller<R: Recognizer = ReporterRecognizer> {
    recognizer: R,
    options: TableOptions,
    loaded: Option<LoadedDocument>,
}

impl Controller<ReporterRecognizer> {
    pub fn new(options: TableOptions) -> Self {
        Self::with_recognizer(ReporterRecognizer::new(), options)
    }
}

impl<R: Recognizer> Controller<R> {
    pub fn with_recognizer(recognizer: R, options: TableOptions) -> Self {
        Controller {
            recognizer,
            options,
            loaded: None,
        }
    }

    /// Loads a document, replacing the current citations on success.
    ///
    /// On failure the previous state is kept as it was.
    pub fn load(&mut self, path: &Path) -> Result<LoadReport, LoadError> {
        let (citations, report) = pipeline::load_document(path, &self.recognizer)?;
        self.loaded = Some(LoadedDocument {
            source: path.to_path_buf(),
            citations,
        });
        Ok(report)
    }

    /// The current citations; empty before the first successful load.
    pub fn citations(&self) -> &[String] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.citations.as_slice())
            .unwrap_or(&[])
    }

    /// The document the current citations came from.
    pub fn source(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|loaded| loaded.source.as_path())
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    fn non_empty_set(&self) -> Option<&CitationSet> {
        self.loaded
            .as_ref()
            .map(|loaded| &loaded.citations)
            .filter(|set| !set.is_empty())
    }

    /// Writes the citations to a plain text file, one per line.
    pub fn export_text(&self, path: &Path) -> Result<ActionOutcome, ExportError> {
        let Some(set) = self.non_empty_set() else {
            return Ok(ActionOutcome::NothingToDo("No citations to export."));
        };
        output::write_text(set, path)?;
        tracing::info!(path = %path.display(), entries = set.len(), "exported text");
        Ok(ActionOutcome::Written(path.to_path_buf()))
    }

    /// Writes the citations to a new document under a heading.
    pub fn export_docx(&self, path: &Path) -> Result<ActionOutcome, ExportError> {
        let Some(set) = self.non_empty_set() else {
            return Ok(ActionOutcome::NothingToDo("No citations to export."));
        };
        output::write_document(set, path, &self.options)?;
        tracing::info!(path = %path.display(), entries = set.len(), "exported document");
        Ok(ActionOutcome::Written(path.to_path_buf()))
    }

    /// Appends the table to a copy of the loaded document.
    pub fn insert_into_original(&self) -> Result<ActionOutcome, ExportError> {
        let Some(set) = self.non_empty_set() else {
            return Ok(ActionOutcome::NothingToDo("No citations to insert."));
        };
        let Some(source) = self.source() else {
            return Ok(ActionOutcome::NothingToDo("Original document not found."));
        };
        let dest = output::insert_into_copy(set, source, &self.options)?;
        tracing::info!(source = %source.display(), dest = %dest.display(), "inserted table");
        Ok(ActionOutcome::Written(dest))
    }

    /// Places the citations on `clipboard`.
    pub fn copy_to(&self, clipboard: &mut dyn Clipboard) -> Result<ActionOutcome, ExportError> {
        let Some(set) = self.non_empty_set() else {
            return Ok(ActionOutcome::NothingToDo("No citations to copy."));
        };
        output::copy_text(set, clipboard)?;
        Ok(ActionOutcome::Copied { entries: set.len() })
    }
}
