//! Shared helpers for integration tests: building `.docx` fixtures on disk.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

/// Writes a `.docx` whose `w:body` contains `body_xml` verbatim.
pub fn docx_with_body(dir: &Path, name: &str, body_xml: &str) -> PathBuf {
    let path = dir.join(name);
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#,
        body_xml
    );

    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

/// Writes a `.docx` with one single-run paragraph per entry.
pub fn docx_with_paragraphs(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                quick_xml::escape::escape(*p)
            )
        })
        .collect();
    docx_with_body(dir, name, &body)
}

/// A short brief citing two cases, an `Id.` and a statute.
pub const BRIEF: &[&str] = &[
    "Plaintiff brings this action under 42 U.S.C. § 1983.",
    "See Smith v. Jones, 123 F.3d 456, 460 (9th Cir. 1999).",
    "Id. at 461.",
    "The same rule appears in Roe v. Wade, 410 U.S. 113 (1973), and later, 123 F.3d at 462.",
    "Again, Smith v. Jones, 123 F.3d 456, 460 (9th Cir. 1999).",
];

/// The table expected from [`BRIEF`], in order.
pub const BRIEF_TABLE: &[&str] = &[
    "123 F.3d at 462",
    "Roe v. Wade, 410 U.S. 113 (1973)",
    "Smith v. Jones, 123 F.3d 456, 460 (1999)",
];
