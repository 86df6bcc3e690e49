use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Text extracted from an uploaded document
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractResponse {
    /// Always `true`
    pub success: bool,
    /// Original name of the uploaded file
    pub filename: String,
    /// Length of `text` in UTF-16 code units, so characters outside the Basic Multilingual
    /// Plane count twice
    pub characters: usize,
    /// Normalized document text
    pub text: String,
}

impl ExtractResponse {
    pub fn new(filename: String, text: String) -> Self {
        Self {
            success: true,
            filename,
            characters: utf16_len(&text),
            text,
        }
    }
}

/// Length as JavaScript clients see it (`String.prototype.length`).
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Unauthorized")]
    pub error: String,
}
