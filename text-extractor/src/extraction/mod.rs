//! Document text extraction.
//!
//! The HTTP layer hands over an [`Upload`]; [`Extractors::extract`] picks a backend from the
//! client-declared MIME type or filename, runs it, and normalizes the result.
//!
//! - [`pdf`]: per-page text via `lopdf`
//! - [`docx`]: raw paragraph text from `word/document.xml` via `zip` + `quick-xml`
//! - [`normalize`]: whitespace cleanup applied to every result
//!
//! Detection trusts the declared type. Bytes are never sniffed, so a mislabelled upload is routed
//! to the wrong parser (and fails there) or rejected as unsupported.

pub mod docx;
pub mod normalize;
pub mod pdf;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error as ThisError;
use tracing::{debug, instrument};

use crate::errors::{Error, Result};

pub use docx::DocxExtractor;
pub use normalize::normalize;
pub use pdf::PdfExtractor;

pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Failures raised by the parsing backends. All of them surface to clients as a single
/// "Extraction failed" response.
#[derive(ThisError, Debug)]
pub enum ExtractionError {
    #[error("failed to parse PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to open DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to parse DOCX XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is missing required part {0}")]
    MissingPart(&'static str),

    #[error("extraction task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A file received from a multipart upload. Lives for a single request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Formats the service knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Classify an upload by its declared MIME type or filename extension.
    ///
    /// DOCX is checked first. MIME types must match exactly; extensions are compared
    /// case-insensitively.
    pub fn detect(mime_type: &str, filename: &str) -> Option<Self> {
        let filename = filename.to_lowercase();

        if mime_type == DOCX_MIME_TYPE || filename.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if mime_type == PDF_MIME_TYPE || filename.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
        }
    }
}

/// A parsing backend for one document format.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Return the raw, un-normalized text of the document.
    async fn extract(&self, bytes: Bytes) -> std::result::Result<String, ExtractionError>;
}

/// Routes uploads to the extractor for their declared format.
#[derive(Clone)]
pub struct Extractors {
    pdf: Arc<dyn TextExtractor>,
    docx: Arc<dyn TextExtractor>,
}

impl Default for Extractors {
    fn default() -> Self {
        Self::new(Arc::new(PdfExtractor), Arc::new(DocxExtractor))
    }
}

impl Extractors {
    pub fn new(pdf: Arc<dyn TextExtractor>, docx: Arc<dyn TextExtractor>) -> Self {
        Self { pdf, docx }
    }

    fn for_kind(&self, kind: DocumentKind) -> &Arc<dyn TextExtractor> {
        match kind {
            DocumentKind::Docx => &self.docx,
            DocumentKind::Pdf => &self.pdf,
        }
    }

    /// Extract and normalize the text of an upload.
    ///
    /// Unrecognized types are rejected before any backend runs.
    #[instrument(skip_all, fields(filename = %upload.filename, mime_type = %upload.mime_type, bytes = upload.bytes.len()))]
    pub async fn extract(&self, upload: &Upload) -> Result<String> {
        let kind = DocumentKind::detect(&upload.mime_type, &upload.filename).ok_or_else(|| Error::UnsupportedFileType {
            mime_type: upload.mime_type.clone(),
            filename: upload.filename.clone(),
        })?;

        debug!(kind = kind.as_str(), "Dispatching upload to extractor");

        let raw = self.for_kind(kind).extract(upload.bytes.clone()).await?;
        let text = normalize(&raw);

        debug!(raw_len = raw.len(), normalized_len = text.len(), "Extraction complete");
        Ok(text)
    }
}
