// Document text extraction: plain text, PDF, and DOCX

use std::io::{Cursor, Read};

use thiserror::Error;

/// Formats the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

#[derive(Debug, Error)]
#[error("unsupported or unreadable document format")]
pub struct UnsupportedFormat;

/// Detect the document format from magic bytes, with the filename
/// extension as a tiebreak for zip containers.
pub fn detect_format(data: &[u8], name: Option<&str>) -> Option<DocumentFormat> {
    if data.starts_with(b"%PDF-") {
        return Some(DocumentFormat::Pdf);
    }

    if data.starts_with(b"PK\x03\x04") {
        // Office documents are zip containers; other zips are rejected
        // later when the word/ entry is missing.
        let looks_like_docx = name
            .map(|n| {
                let lower = n.to_lowercase();
                lower.ends_with(".docx") || lower.ends_with(".doc")
            })
            .unwrap_or(true);
        return looks_like_docx.then_some(DocumentFormat::Docx);
    }

    if std::str::from_utf8(data).is_ok() {
        return Some(DocumentFormat::PlainText);
    }

    None
}

/// Extract plain text from a document's raw bytes.
///
/// `name` is an optional filename hint used only to disambiguate zip
/// containers. Returns `UnsupportedFormat` for unrecognized or
/// undecodable input.
pub fn extract_text(data: &[u8], name: Option<&str>) -> Result<String, UnsupportedFormat> {
    match detect_format(data, name).ok_or(UnsupportedFormat)? {
        DocumentFormat::PlainText => {
            // Detection already proved this is valid UTF-8
            Ok(String::from_utf8_lossy(data).into_owned())
        }
        DocumentFormat::Pdf => {
            pdf_extract::extract_text_from_mem(data).map_err(|_| UnsupportedFormat)
        }
        DocumentFormat::Docx => extract_docx(data),
    }
}

/// Pull paragraph text out of a DOCX container.
fn extract_docx(data: &[u8]) -> Result<String, UnsupportedFormat> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|_| UnsupportedFormat)?;

    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| UnsupportedFormat)?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|_| UnsupportedFormat)?;

    Ok(document_xml_to_text(&xml))
}

/// Convert WordprocessingML to plain text: paragraph ends become
/// newlines, all other markup is stripped.
fn document_xml_to_text(xml: &str) -> String {
    let with_breaks = xml.replace("</w:p>", "\n");
    let stripped = strip_xml_tags(&with_breaks);
    decode_entities(&stripped)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip XML tags from a string.
fn strip_xml_tags(xml: &str) -> String {
    let mut result = String::with_capacity(xml.len());
    let mut in_tag = false;

    for ch in xml.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
}

/// Decode the XML entities WordprocessingML emits.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
}
