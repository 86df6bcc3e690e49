//! Test utilities for integration testing.

use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::config::{Config, LimitsConfig};
use crate::extraction::{ExtractionError, Extractors, TextExtractor};

pub const TEST_API_KEY: &str = "test-api-key";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_key: Some(TEST_API_KEY.to_string()),
        limits: LimitsConfig::default(),
        enable_metrics: false,
        enable_otel_export: false,
    }
}

/// Test server backed by the real PDF and DOCX extractors.
pub fn create_test_app(config: Config) -> TestServer {
    crate::Application::new(config)
        .expect("Failed to create application")
        .into_test_server()
}

/// Test server with caller-supplied extractors, e.g. spies.
pub fn create_test_app_with_extractors(config: Config, extractors: Extractors) -> TestServer {
    crate::Application::with_extractors(config, extractors)
        .expect("Failed to create application")
        .into_test_server()
}

/// Extractor that records how often it was invoked and returns a canned result.
#[derive(Debug)]
pub struct SpyExtractor {
    calls: AtomicUsize,
    output: Option<String>,
}

impl SpyExtractor {
    pub fn returning(output: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: Some(output.to_string()),
        }
    }

    /// Every call fails as if the document were corrupt.
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for SpyExtractor {
    async fn extract(&self, _bytes: Bytes) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.clone().ok_or(ExtractionError::MissingPart("spy failure"))
    }
}

/// Extractors whose PDF and DOCX backends are both spies returning `output`.
pub fn spy_extractors(output: &str) -> (Extractors, Arc<SpyExtractor>, Arc<SpyExtractor>) {
    let pdf = Arc::new(SpyExtractor::returning(output));
    let docx = Arc::new(SpyExtractor::returning(output));
    (Extractors::new(pdf.clone(), docx.clone()), pdf, docx)
}

/// A minimal one-page PDF whose only text is "Hello World".
pub fn hello_world_pdf() -> Vec<u8> {
    pdf_with_pages(&[&["Hello World"]])
}

/// Build a PDF where each entry is a page and each string on it is a separate text object.
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let pages = pages
        .iter()
        .map(|items| {
            let mut operations = Vec::new();
            for (index, item) in items.iter().enumerate() {
                let y = 700 - 20 * index as i64;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*item)]));
                operations.push(Operation::new("ET", vec![]));
            }
            operations
        })
        .collect();

    pdf_from_operations(pages)
}

/// Build a PDF with one page per operation list. Every page has the WinAnsi Courier font `F1`.
pub fn pdf_from_operations(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize test PDF");
    bytes
}

/// Wrap raw `w:body` content in a DOCX container.
pub fn docx_from_body(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">
<w:body>{body}</w:body>
</w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    writer
        .start_file("[Content_Types].xml", options)
        .expect("Failed to start content types entry");
    writer
        .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .expect("Failed to write content types");

    writer
        .start_file("word/document.xml", options)
        .expect("Failed to start document entry");
    writer.write_all(document.as_bytes()).expect("Failed to write document");

    writer.finish().expect("Failed to finish DOCX archive").into_inner()
}

/// A DOCX with one single-run paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    docx_from_body(&body)
}
