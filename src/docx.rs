//! Word (`.docx`) package reading and writing.
//!
//! A `.docx` file is a ZIP archive; the body text lives in `word/document.xml`.
//! Reading walks that part with `quick-xml` and keeps the text of top-level
//! body paragraphs. Writing produces either a fresh minimal package or a copy
//! of an existing package with extra paragraphs appended to the body.

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Heading used for the generated table when none is configured.
pub const DEFAULT_HEADING: &str = "Table of Authorities";

/// Font size (in points) of table entries when none is configured.
pub const DEFAULT_FONT_SIZE_PT: f32 = 11.0;

const DOCUMENT_PART: &str = "word/document.xml";

/// Errors that can occur when reading or writing a `.docx` package.
#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a valid .docx package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// How the Table of Authorities is laid out in a generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Heading text placed above the entries
    pub heading: String,
    /// Font size of each entry, in points
    pub font_size_pt: f32,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            heading: DEFAULT_HEADING.to_string(),
            font_size_pt: DEFAULT_FONT_SIZE_PT,
        }
    }
}

impl TableOptions {
    /// WordprocessingML sizes are expressed in half-points.
    fn half_points(&self) -> u32 {
        (self.font_size_pt * 2.0).round().max(2.0) as u32
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Extracts the document text: every top-level body paragraph, joined by a single space.
pub fn extract_text(path: &Path) -> Result<String, DocxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let document_xml = read_part(&mut archive, DOCUMENT_PART)?;
    let paragraphs = paragraph_texts(&document_xml)?;
    tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "extracted document text");
    Ok(paragraphs.join(" "))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, DocxError> {
    let mut part = archive
        .by_name(name)
        .map_err(|_| DocxError::MissingPart(name.to_string()))?;
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(content)
}

/// Returns the text of each paragraph that is a direct child of `w:body`.
///
/// Paragraphs nested in tables or text boxes are not body paragraphs and are
/// skipped. Within a paragraph, run text is concatenated; `w:tab` becomes a
/// tab, text-wrapping `w:br` and `w:cr` become newlines.
pub fn paragraph_texts(document_xml: &str) -> Result<Vec<String>, DocxError> {
    let mut reader = Reader::from_str(document_xml);
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" && parent_is(&stack, b"body") {
                    current = Some(String::new());
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref() == b"p" && parent_is(&stack, b"body") {
                    paragraphs.push(String::new());
                } else if let Some(text) = current.as_mut() {
                    if parent_is(&stack, b"r") && paragraph_depth(&stack) == 1 {
                        match name.as_ref() {
                            b"tab" => text.push('\t'),
                            b"br" if is_text_wrapping_break(&e) => text.push('\n'),
                            b"cr" => text.push('\n'),
                            b"noBreakHyphen" => text.push('-'),
                            _ => {}
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    let in_run_text = stack.len() >= 2
                        && stack[stack.len() - 1] == b"t"
                        && stack[stack.len() - 2] == b"r";
                    if in_run_text && paragraph_depth(&stack) == 1 {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(_) => {
                let closed = stack.pop();
                if closed.as_deref() == Some(b"p".as_slice()) && parent_is(&stack, b"body") {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|last| last == name)
}

fn paragraph_depth(stack: &[Vec<u8>]) -> usize {
    stack.iter().filter(|name| name.as_slice() == b"p").count()
}

/// Page and column breaks do not contribute text.
fn is_text_wrapping_break(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.local_name().as_ref() == b"type")
        .map_or(true, |attr| attr.value.as_ref() == b"textWrapping")
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes a new `.docx` containing a `Title` heading followed by one paragraph per entry.
pub fn write_table_document(
    path: &Path,
    entries: &[String],
    options: &TableOptions,
) -> Result<(), DocxError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", W_NAMESPACE), ("xmlns:r", R_NAMESPACE)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;
    write_table(&mut writer, entries, options, "Title")?;
    write_section_properties(&mut writer)?;
    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    let document_xml = writer.into_inner();

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
        ("word/styles.xml", STYLES.as_bytes()),
        (DOCUMENT_PART, &document_xml),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(name, file_options())?;
        zip.write_all(content)?;
    }
    let bytes = zip.finish()?.into_inner();

    fs::write(path, bytes)?;
    Ok(())
}

/// Copies `source` to `dest`, appending a page break, a `Heading1` heading and
/// one paragraph per entry to the end of the document body.
///
/// `source` is only read; the result is assembled in memory and written to
/// `dest` in one go.
pub fn append_table_document(
    source: &Path,
    dest: &Path,
    entries: &[String],
    options: &TableOptions,
) -> Result<(), DocxError> {
    let file = File::open(source)?;
    let mut archive = ZipArchive::new(file)?;
    let document_xml = read_part(&mut archive, DOCUMENT_PART)?;

    let mut writer = Writer::new(Vec::new());
    write_page_break(&mut writer)?;
    write_table(&mut writer, entries, options, "Heading1")?;
    let fragment = String::from_utf8(writer.into_inner())
        .map_err(|e| DocxError::Malformed(format!("generated XML is not UTF-8: {}", e)))?;

    let updated = splice_into_body(&document_xml, &fragment)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if entry.is_dir() {
            zip.add_directory(name, file_options())?;
            continue;
        }

        let mut data = Vec::new();
        if name == DOCUMENT_PART {
            data.extend_from_slice(updated.as_bytes());
        } else {
            entry.read_to_end(&mut data)?;
        }
        zip.start_file(name, file_options())?;
        zip.write_all(&data)?;
    }
    let bytes = zip.finish()?.into_inner();

    fs::write(dest, bytes)?;
    Ok(())
}

/// `<dir>/<stem>_with_TOA.docx` next to the original document.
pub fn with_toa_path(source: &Path) -> Result<PathBuf, DocxError> {
    let stem = source
        .file_stem()
        .ok_or_else(|| DocxError::Malformed(format!("'{}' has no file name", source.display())))?;
    Ok(source.with_file_name(format!("{}_with_TOA.docx", stem.to_string_lossy())))
}

/// Inserts `fragment` as the last block of the body.
///
/// The body-level `w:sectPr` must stay the last child of `w:body`, so the
/// fragment goes in front of it when present.
fn splice_into_body(document_xml: &str, fragment: &str) -> Result<String, DocxError> {
    let body_end = document_xml
        .rfind("</w:body>")
        .ok_or_else(|| DocxError::Malformed("document has no w:body element".to_string()))?;
    let head = &document_xml[..body_end];

    let last_block_end = ["</w:p>", "<w:p/>", "</w:tbl>", "</w:sdt>"]
        .iter()
        .filter_map(|tag| head.rfind(tag).map(|i| i + tag.len()))
        .max()
        .unwrap_or(0);

    let insert_at = find_section_properties(&head[last_block_end..])
        .map_or(body_end, |i| last_block_end + i);

    let mut out = String::with_capacity(document_xml.len() + fragment.len());
    out.push_str(&document_xml[..insert_at]);
    out.push_str(fragment);
    out.push_str(&document_xml[insert_at..]);
    Ok(out)
}

/// Offset of the first `<w:sectPr>` start tag; `<w:sectPrChange>` does not count.
fn find_section_properties(xml: &str) -> Option<usize> {
    const TAG: &str = "<w:sectPr";
    xml.match_indices(TAG).map(|(i, _)| i).find(|&i| {
        matches!(
            xml.as_bytes().get(i + TAG.len()).copied(),
            Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')
        )
    })
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn write_table<W: Write>(
    writer: &mut Writer<W>,
    entries: &[String],
    options: &TableOptions,
    heading_style: &str,
) -> Result<(), quick_xml::Error> {
    write_heading(writer, &options.heading, heading_style)?;
    let size = options.half_points().to_string();
    for entry in entries {
        write_entry(writer, entry, &size)?;
    }
    Ok(())
}

fn write_heading<W: Write>(writer: &mut Writer<W>, text: &str, style: &str) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
    writer.write_event(Event::Empty(BytesStart::new("w:pStyle").with_attributes([("w:val", style)])))?;
    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    write_text(writer, text)?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_entry<W: Write>(writer: &mut Writer<W>, text: &str, half_points: &str) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
    writer.write_event(Event::Empty(BytesStart::new("w:sz").with_attributes([("w:val", half_points)])))?;
    writer.write_event(Event::Empty(BytesStart::new("w:szCs").with_attributes([("w:val", half_points)])))?;
    writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    write_text(writer, text)?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(
        BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    Ok(())
}

fn write_page_break<W: Write>(writer: &mut Writer<W>) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Empty(BytesStart::new("w:br").with_attributes([("w:type", "page")])))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

/// US Letter with one-inch margins.
fn write_section_properties<W: Write>(writer: &mut Writer<W>) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;
    writer.write_event(Event::Empty(
        BytesStart::new("w:pgSz").with_attributes([("w:w", "12240"), ("w:h", "15840")]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("w:pgMar").with_attributes([
        ("w:top", "1440"),
        ("w:right", "1440"),
        ("w:bottom", "1440"),
        ("w:left", "1440"),
        ("w:header", "720"),
        ("w:footer", "720"),
        ("w:gutter", "0"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
    Ok(())
}

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Title">
    <w:name w:val="Title"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:spacing w:after="300"/></w:pPr>
    <w:rPr><w:sz w:val="56"/><w:szCs w:val="56"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="480"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr>
  </w:style>
</w:styles>"#;
