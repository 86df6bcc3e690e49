use crate::api::models::extract::ErrorResponse;
use crate::extraction::ExtractionError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing or mismatched `x-api-key` header
    #[error("Not authenticated")]
    Unauthenticated,

    /// Multipart request carried no `file` part
    #[error("No file uploaded")]
    MissingFile,

    /// Declared MIME type and filename match neither DOCX nor PDF
    #[error("Unsupported file type: {mime_type} ({filename})")]
    UnsupportedFileType { mime_type: String, filename: String },

    /// Upload exceeded the configured size limit
    #[error("File size exceeds maximum allowed size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// The parsing backend failed on the uploaded document
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::MissingFile => StatusCode::BAD_REQUEST,
            Error::UnsupportedFileType { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated => "Unauthorized".to_string(),
            Error::MissingFile => "No file uploaded".to_string(),
            Error::UnsupportedFileType { .. } => "Unsupported file type".to_string(),
            Error::PayloadTooLarge { .. } => "File too large".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Extraction(_) => "Extraction failed".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Full details stay server-side; the client only sees the user message
        match &self {
            Error::Extraction(_) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Unauthenticated => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::PayloadTooLarge { .. } => {
                tracing::warn!("Rejected upload: {}", self);
            }
            Error::MissingFile | Error::UnsupportedFileType { .. } | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorResponse {
            error: self.user_message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
