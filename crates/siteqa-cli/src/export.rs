//! Save an answer and its related information as PDF or Word files

use printpdf::lopdf::Document;
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Read, Write};
use std::str::FromStr;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use siteqa_core::{Error, RelatedChunk, Result};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;
const FONT_SIZE: f32 = 12.0;
const LEADING: f32 = 14.0;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" "#,
    r#"ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" "#,
    r#"ContentType="application/vnd.openxmlformats-officedocument"#,
    r#".wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" "#,
    r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" "#,
    r#"Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

/// Encoding printpdf uses for text set in a builtin font
const PDF_TEXT_ENCODING: &str = "WinAnsiEncoding";

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Render `answer` and `related` in this format
    pub fn render(&self, answer: &str, related: &[RelatedChunk]) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Pdf => export_pdf(answer, related),
            ExportFormat::Docx => export_docx(answer, related),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" | "word" => Ok(ExportFormat::Docx),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format: {other} (expected pdf or docx)"
            ))),
        }
    }
}

/// Lines of an export, in document order
pub fn export_lines(answer: &str, related: &[RelatedChunk]) -> Vec<String> {
    let mut lines = vec!["Generated Response:".to_string()];
    lines.extend(answer.lines().map(str::to_string));
    lines.push("Related Information:".to_string());
    for chunk in related {
        lines.push(format!("Title: {}", chunk.title));
        lines.push(format!("Summary: {}", chunk.summary));
    }
    lines
}

fn export_err(e: impl std::fmt::Display) -> Error {
    Error::Export(e.to_string())
}

/// Drop characters XML 1.0 does not allow in character data
fn xml_text(line: &str) -> String {
    line.chars()
        .filter(|&c| match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= '\u{20}',
        })
        .collect()
}

/// Make a line safe for a builtin PDF font.
///
/// Builtin fonts only cover WinAnsi, and printpdf silently drops anything
/// outside it, so those characters become `?` instead.
fn pdf_text(line: &str) -> String {
    line.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c if c.is_ascii() => Some(c),
            c => {
                let mut buf = [0; 4];
                let encoded =
                    Document::encode_text(Some(PDF_TEXT_ENCODING), c.encode_utf8(&mut buf));
                Some(if encoded.is_empty() { '?' } else { c })
            }
        })
        .collect()
}

/// Build a minimal WordprocessingML package, one paragraph per line
pub fn export_docx(answer: &str, related: &[RelatedChunk]) -> Result<Vec<u8>> {
    let document = document_xml(&export_lines(answer, related))?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", document.as_slice()),
    ] {
        zip.start_file(name, options).map_err(export_err)?;
        zip.write_all(body).map_err(export_err)?;
    }

    let cursor = zip.finish().map_err(export_err)?;
    Ok(cursor.into_inner())
}

fn document_xml(lines: &[String]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(export_err)?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", WORD_NS));
    writer.write_event(Event::Start(root)).map_err(export_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("w:body")))
        .map_err(export_err)?;

    for line in lines {
        let clean = xml_text(line);
        let mut text = BytesStart::new("w:t");
        text.push_attribute(("xml:space", "preserve"));

        for event in [
            Event::Start(BytesStart::new("w:p")),
            Event::Start(BytesStart::new("w:r")),
            Event::Start(text),
            Event::Text(BytesText::new(&clean)),
            Event::End(BytesEnd::new("w:t")),
            Event::End(BytesEnd::new("w:r")),
            Event::End(BytesEnd::new("w:p")),
        ] {
            writer.write_event(event).map_err(export_err)?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("w:body")))
        .map_err(export_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:document")))
        .map_err(export_err)?;

    Ok(writer.into_inner().into_inner())
}

/// Paragraph texts of a `.docx` package, in order
pub fn read_docx_paragraphs(bytes: &[u8]) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(export_err)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(export_err)?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => current = Some(String::new()),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                if let Some(text) = current.take() {
                    paragraphs.push(text);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape().map_err(export_err)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(export_err(format!("XML parse error: {e}"))),
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Lay the export out on US letter pages in 12pt Helvetica.
///
/// Text outside WinAnsi (CJK, Cyrillic, emoji) is shown as `?`; use the
/// Word export for those.
pub fn export_pdf(answer: &str, related: &[RelatedChunk]) -> Result<Vec<u8>> {
    let width = Mm::from(Pt(PAGE_WIDTH));
    let height = Mm::from(Pt(PAGE_HEIGHT));

    let (doc, page, layer) = PdfDocument::new("Generated Response", width, height, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(export_err)?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;
    let mut pages = 1;

    for line in export_lines(answer, related) {
        if y <= MARGIN {
            pages += 1;
            let (page, layer) = doc.add_page(width, height, format!("Layer {pages}"));
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT - MARGIN;
        }

        current.use_text(pdf_text(&line), FONT_SIZE, Mm::from(Pt(MARGIN)), Mm::from(Pt(y)), &font);
        y -= LEADING;
    }

    doc.save_to_bytes().map_err(export_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn related() -> Vec<RelatedChunk> {
        vec![
            RelatedChunk {
                title: "Example Domain".to_string(),
                summary: "This domain is for use in illustrative examples".to_string(),
                image_url: None,
            },
            RelatedChunk {
                title: "Related Information".to_string(),
                summary: "Fish & chips <served> daily".to_string(),
                image_url: Some("https://example.com/a.png".to_string()),
            },
        ]
    }

    #[test]
    fn test_export_lines_order() {
        let lines = export_lines("First line\nSecond line", &related());
        assert_eq!(
            lines,
            vec![
                "Generated Response:",
                "First line",
                "Second line",
                "Related Information:",
                "Title: Example Domain",
                "Summary: This domain is for use in illustrative examples",
                "Title: Related Information",
                "Summary: Fish & chips <served> daily",
            ]
        );
    }

    #[test]
    fn test_docx_round_trip_preserves_lines() {
        let answer = "The page is a placeholder.\n\n  Indented line\nLast line";
        let bytes = export_docx(answer, &related()).unwrap();
        let paragraphs = read_docx_paragraphs(&bytes).unwrap();

        assert_eq!(paragraphs, export_lines(answer, &related()));
        let answer_lines: Vec<&str> = answer.lines().collect();
        assert_eq!(paragraphs[1..=answer_lines.len()], answer_lines[..]);
    }

    #[test]
    fn test_docx_package_parts() {
        let bytes = export_docx("answer", &[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();

        assert_eq!(names, vec!["[Content_Types].xml", "_rels/.rels", "word/document.xml"]);
    }

    #[test]
    fn test_read_docx_rejects_garbage() {
        assert!(matches!(read_docx_paragraphs(b"not a zip"), Err(Error::Export(_))));
    }

    #[test]
    fn test_docx_strips_control_characters() {
        let bytes = export_docx("bell\u{7} and\u{1} null\u{0}\ttab", &[]).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut xml = Vec::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_end(&mut xml)
            .unwrap();
        assert!(!xml.iter().any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')));

        let paragraphs = read_docx_paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs[1], "bell and null\ttab");
    }

    fn pdf_text_of(bytes: &[u8]) -> (usize, String) {
        let doc = Document::load_mem(bytes).unwrap();
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        (pages.len(), doc.extract_text(&pages).unwrap())
    }

    #[test]
    fn test_pdf_contains_export_lines() {
        let bytes = export_pdf("answer", &related()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let (pages, text) = pdf_text_of(&bytes);
        assert_eq!(pages, 1);
        for line in export_lines("answer", &related()) {
            assert!(text.contains(&line), "missing {line:?} in {text:?}");
        }
    }

    #[test]
    fn test_pdf_replaces_characters_outside_winansi() {
        assert_eq!(pdf_text("Café 東京 ok"), "Café ?? ok");
        assert_eq!(pdf_text("a\tb\u{1}c"), "a bc");

        let bytes = export_pdf("Café 東京 ok", &[]).unwrap();
        let (_, text) = pdf_text_of(&bytes);
        assert!(text.contains("Café ?? ok"), "got {text:?}");
    }

    #[test]
    fn test_pdf_breaks_long_answers_across_pages() {
        let answer = (1..=200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let (pages, text) = pdf_text_of(&export_pdf(&answer, &related()).unwrap());
        assert!(pages > 1);
        assert!(text.contains("line 200"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("word".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert_eq!(ExportFormat::Docx.extension(), "docx");
        assert_eq!(ExportFormat::Pdf.mime(), "application/pdf");
    }
}
