//! Plain text from Word (.docx) documents.
//!
//! Only the main body part (`word/document.xml`) is read. Each `<w:p>`
//! becomes one line; headers, footers and comments are ignored.

use crate::ExtractionError;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_text_from_docx(docx_bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(docx_bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a Word archive: {}", e)))?;

    let mut document_xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ExtractionError::Docx(format!("failed to read {}: {}", DOCUMENT_PART, e)))?;

    paragraphs_from_xml(&document_xml).map(|paragraphs| paragraphs.join("\n"))
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .decode()
                    .map_err(|e| ExtractionError::Docx(format!("bad text node: {}", e)))?;
                current.push_str(&text);
            }
            Ok(Event::GeneralRef(ref e)) if in_text => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|e| ExtractionError::Docx(format!("bad character reference: {}", e)))?
                {
                    current.push(ch);
                } else {
                    let name = e
                        .decode()
                        .map_err(|e| ExtractionError::Docx(format!("bad entity: {}", e)))?;
                    if let Some(value) = resolve_predefined_entity(&name) {
                        current.push_str(value);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Docx(format!(
                    "malformed {} at position {}: {}",
                    DOCUMENT_PART,
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
