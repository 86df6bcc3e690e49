use crate::AppState;
use crate::api::models::extract::{ErrorResponse, ExtractResponse, utf16_len};
use crate::errors::{Error, Result};
use crate::extraction::Upload;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use bytes::{Bytes, BytesMut};

/// Name of the multipart field carrying the document
pub const FILE_FIELD: &str = "file";

/// Content type assumed when the file part does not declare one
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[utoipa::path(
    post,
    path = "/extract",
    tag = "extraction",
    summary = "Extract document text",
    description = "Upload a PDF or DOCX document in the `file` field and receive its plain text.

The format is chosen from the declared content type of the part or the filename extension; the bytes are not inspected.
Runs of three or more newlines are collapsed to a blank line, runs of spaces and tabs to a single space, and the result is trimmed.",
    request_body(
        content_type = "multipart/form-data",
        description = "A single file part named `file`"
    ),
    responses(
        (status = 200, description = "Text extracted", body = ExtractResponse),
        (status = 400, description = "No file uploaded, or unsupported file type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid `x-api-key` header", body = ErrorResponse),
        (status = 413, description = "File exceeds the configured size limit", body = ErrorResponse),
        (status = 500, description = "The document could not be parsed", body = ErrorResponse),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>> {
    // Bodies that are not multipart at all carry no file
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!("Rejected non-multipart body: {}", rejection);
        Error::MissingFile
    })?;

    let upload = read_upload(multipart, state.config.limits.max_file_size)
        .await?
        .ok_or(Error::MissingFile)?;

    tracing::info!(
        filename = %upload.filename,
        mime_type = %upload.mime_type,
        bytes = upload.bytes.len(),
        "Received upload"
    );

    let text = state.extractors.extract(&upload).await?;

    tracing::info!(filename = %upload.filename, characters = utf16_len(&text), "Extracted text");

    Ok(Json(ExtractResponse::new(upload.filename, text)))
}

/// Pull the single file part out of the multipart stream.
///
/// Parts without a filename are plain form fields and are skipped. A file under any other field
/// name, or a second `file` part, is rejected.
async fn read_upload(mut multipart: Multipart, max_file_size: u64) -> Result<Option<Upload>> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        let Some(filename) = field.file_name().map(str::to_string) else {
            tracing::trace!(field = %field_name, "Skipping non-file field");
            continue;
        };

        if field_name != FILE_FIELD || upload.is_some() {
            tracing::debug!(field = %field_name, filename = %filename, "Unexpected file field");
            return Err(Error::BadRequest {
                message: "Unexpected field".to_string(),
            });
        }

        let mime_type = field.content_type().unwrap_or(DEFAULT_MIME_TYPE).to_string();
        let bytes = read_file(field, max_file_size).await?;

        upload = Some(Upload {
            filename,
            mime_type,
            bytes,
        });
    }

    Ok(upload)
}

/// Buffer a file part, failing as soon as it grows past the size limit.
async fn read_file(mut field: Field<'_>, max_file_size: u64) -> Result<Bytes> {
    let mut buffer = BytesMut::new();
    let mut total_size = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max_file_size))? {
        total_size += chunk.len() as u64;

        if total_size > max_file_size {
            tracing::warn!(
                total_size = total_size,
                max_file_size = max_file_size,
                "File size limit exceeded, aborting upload"
            );
            return Err(Error::PayloadTooLarge { limit: max_file_size });
        }

        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer.freeze())
}

fn multipart_error(error: MultipartError, max_file_size: u64) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::PayloadTooLarge { limit: max_file_size };
    }

    tracing::debug!("Failed to parse multipart data: {}", error.body_text());
    Error::BadRequest {
        message: "Invalid multipart request".to_string(),
    }
}
