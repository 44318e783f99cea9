//! Sinks for a finished Table of Authorities.
//!
//! Each sink takes the citation set as-is; deciding whether there is anything
//! to write is up to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::docx::{self, DocxError, TableOptions};
use crate::set::CitationSet;

/// Errors that can occur when writing a table to one of the sinks.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocxError),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Writes the newline-joined citations to `path` as UTF-8.
///
/// The same set always produces the same bytes.
pub fn write_text(set: &CitationSet, path: &Path) -> Result<(), ExportError> {
    fs::write(path, set.to_text()).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a new document with a heading and one paragraph per citation.
pub fn write_document(set: &CitationSet, path: &Path, options: &TableOptions) -> Result<(), ExportError> {
    docx::write_table_document(path, set.as_slice(), options)?;
    Ok(())
}

/// Appends the table to a copy of `original` named `<stem>_with_TOA.docx`.
///
/// Returns the path of the new file. The original is left untouched.
pub fn insert_into_copy(
    set: &CitationSet,
    original: &Path,
    options: &TableOptions,
) -> Result<PathBuf, ExportError> {
    let dest = docx::with_toa_path(original)?;
    docx::append_table_document(original, &dest, set.as_slice(), options)?;
    Ok(dest)
}

/// Somewhere the newline-joined table can be placed for pasting.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError>;
}

/// The operating system clipboard.
///
/// The connection is opened on first use and kept for the life of the value;
/// on X11 and Wayland the copied text stays available only while it is alive.
/// A process that exits right after copying should use [`SystemClipboard::holding`].
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    hold: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// On Linux, `set_text` blocks until another application takes over the
    /// clipboard, so the text outlives the calling process' other work.
    pub fn holding() -> Self {
        SystemClipboard {
            inner: None,
            hold: true,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold && cfg!(target_os = "linux")
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?,
        };
        let clipboard = self.inner.insert(clipboard);

        #[cfg(target_os = "linux")]
        if self.hold {
            use arboard::SetExtLinux;
            return clipboard
                .set()
                .wait()
                .text(text.to_string())
                .map_err(|e| ExportError::Clipboard(e.to_string()));
        }

        clipboard
            .set_text(text.to_string())
            .map_err(|e| ExportError::Clipboard(e.to_string()))
    }
}

/// Places the newline-joined citations on `clipboard`.
pub fn copy_text(set: &CitationSet, clipboard: &mut dyn Clipboard) -> Result<(), ExportError> {
    clipboard.set_text(&set.to_text())
}
