//! DOCX raw text extraction.
//!
//! DOCX files are ZIP archives containing XML files in Open XML format; the body lives in
//! `word/document.xml`. Raw text keeps run text and tabs, with every paragraph followed by a blank
//! line. Line and page breaks add nothing. Formatting, deleted text and field codes are dropped.
//! For alternate content the `mc:Fallback` branch is read and `mc:Choice` is skipped.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::result::ZipError;

use super::{ExtractionError, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts raw text from Word documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        tokio::task::spawn_blocking(move || raw_text(&bytes)).await?
    }
}

/// Open the archive and return the raw text of its main document part.
pub fn raw_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let xml = match archive.by_name(DOCUMENT_PART) {
        Ok(mut part) => {
            let mut content = String::new();
            part.read_to_string(&mut content)?;
            content
        }
        Err(ZipError::FileNotFound) => return Err(ExtractionError::MissingPart(DOCUMENT_PART)),
        Err(e) => return Err(e.into()),
    };

    document_text(&xml)
}

/// Walk `document.xml` and collect the visible text.
fn document_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();

    // Runs nest when a run carries a text box with its own paragraphs
    let mut run_depth = 0usize;
    let mut in_text = false;
    // Depth inside an mc:Choice subtree; the mc:Fallback sibling is read instead
    let mut choice_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if choice_depth > 0 {
                    choice_depth += 1;
                } else {
                    match e.local_name().as_ref() {
                        b"Choice" => choice_depth = 1,
                        b"r" => run_depth += 1,
                        b"t" if run_depth > 0 => in_text = true,
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                if choice_depth > 0 {
                    choice_depth -= 1;
                } else {
                    match e.local_name().as_ref() {
                        b"p" => text.push_str("\n\n"),
                        b"r" => run_depth = run_depth.saturating_sub(1),
                        b"t" => in_text = false,
                        _ => {}
                    }
                }
            }
            Event::Empty(ref e) if choice_depth == 0 => match e.local_name().as_ref() {
                b"p" => text.push_str("\n\n"),
                b"tab" if run_depth > 0 => text.push('\t'),
                _ => {}
            },
            Event::Text(ref e) if in_text && choice_depth == 0 => {
                text.push_str(&e.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
