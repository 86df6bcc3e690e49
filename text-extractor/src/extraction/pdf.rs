//! PDF text extraction backed by `lopdf`.
//!
//! Pages are visited in order and each page's content stream is walked operator by operator. Every
//! text-showing operator (`Tj`, `TJ`, `'`, `"`) yields one text item, decoded with the encoding of
//! the font selected by the last `Tf`. Items are joined with a space and every page is terminated
//! with a newline, so page breaks survive normalization as line breaks.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{ExtractionError, TextExtractor};

/// Kerning adjustments inside a `TJ` array larger than this (in thousandths of an em) separate words.
const TJ_WORD_GAP: i64 = -100;

/// Extracts text from PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        tokio::task::spawn_blocking(move || document_text(&bytes)).await?
    }
}

/// Concatenate the text of every page in page order.
pub fn document_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();
    debug!(pages = pages.len(), "Loaded PDF document");

    let mut full_text = String::new();
    for (page_number, page_id) in pages {
        let items = page_items(&document, page_id)?;
        trace!(page_number, items = items.len(), "Extracted page text");

        full_text.push_str(&items.join(" "));
        full_text.push('\n');
    }

    Ok(full_text)
}

/// One entry per text-showing operator on the page, blank ones dropped.
fn page_items(document: &Document, page_id: ObjectId) -> Result<Vec<String>, ExtractionError> {
    let encodings: BTreeMap<Vec<u8>, String> = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding().to_string()))
        .collect();

    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut items = Vec::new();
    let mut encoding: Option<&str> = None;

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                // Unknown font names fall back to the standard encoding
                encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| encodings.get(name))
                    .map(String::as_str);
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let item = shown_text(operation, encoding);
                if !item.trim().is_empty() {
                    items.push(item);
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Decode the string operands of a text-showing operator. `"` also carries two spacing numbers,
/// which are skipped along with any other non-string operand.
fn shown_text(operation: &Operation, encoding: Option<&str>) -> String {
    let mut text = String::new();
    for operand in &operation.operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)),
            Object::Array(elements) => {
                for element in elements {
                    match element {
                        Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)),
                        Object::Integer(adjust) if *adjust < TJ_WORD_GAP => text.push(' '),
                        Object::Real(adjust) if (*adjust as i64) < TJ_WORD_GAP => text.push(' '),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{hello_world_pdf, pdf_from_operations, pdf_with_pages};

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_single_page() {
        let text = document_text(&hello_world_pdf()).unwrap();
        assert_eq!(text, "Hello World\n");
    }

    #[test]
    fn test_pages_in_order_one_line_each() {
        let pdf = pdf_with_pages(&[&["First page"], &["Second", "page"], &["Third"]]);

        let text = document_text(&pdf).unwrap();
        assert_eq!(text, "First page\nSecond page\nThird\n");
    }

    #[test]
    fn test_page_without_text() {
        let pdf = pdf_with_pages(&[&["Before"], &[], &["After"]]);

        let text = document_text(&pdf).unwrap();
        assert_eq!(text, "Before\n\nAfter\n");
    }

    #[test]
    fn test_shows_in_one_text_object_are_separate_items() {
        let pdf = pdf_from_operations(vec![vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("First line")]),
            op("Td", vec![0.into(), (-14).into()]),
            op("Tj", vec![Object::string_literal("Second line")]),
            op("ET", vec![]),
        ]]);

        let text = document_text(&pdf).unwrap();
        assert_eq!(text, "First line Second line\n");
    }

    #[test]
    fn test_quote_operators_show_text() {
        let pdf = pdf_from_operations(vec![vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("TL", vec![14.into()]),
            op("Tj", vec![Object::string_literal("Alpha")]),
            op("'", vec![Object::string_literal("Beta")]),
            op("\"", vec![1.into(), 0.into(), Object::string_literal("Gamma")]),
            op("ET", vec![]),
        ]]);

        let text = document_text(&pdf).unwrap();
        assert_eq!(text, "Alpha Beta Gamma\n");
    }

    #[test]
    fn test_tj_array_is_one_item_with_word_gaps() {
        let pdf = pdf_from_operations(vec![vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Ker"),
                    (-20).into(),
                    Object::string_literal("ned"),
                    (-250).into(),
                    Object::string_literal("words"),
                ])],
            ),
            op("Tj", vec![Object::string_literal("after")]),
            op("ET", vec![]),
        ]]);

        let text = document_text(&pdf).unwrap();
        assert_eq!(text, "Kerned words after\n");
    }

    #[test]
    fn test_font_encoding_follows_tf() {
        // 0xE9 is "é" in WinAnsiEncoding, which the fixture font declares
        let pdf = pdf_from_operations(vec![vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Tj", vec![Object::String(b"Caf\xe9".to_vec(), lopdf::StringFormat::Literal)]),
            op("ET", vec![]),
        ]]);

        let text = document_text(&pdf).unwrap();
        assert_eq!(text, "Café\n");
    }

    #[test]
    fn test_garbage_is_an_error() {
        let result = document_text(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractionError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_extractor_runs_off_the_runtime() {
        let text = PdfExtractor.extract(Bytes::from(hello_world_pdf())).await.unwrap();
        assert_eq!(text.trim(), "Hello World");
    }
}
