//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the handler annotations and response schemas. The document is served as
//! JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;
use crate::auth::middleware::API_KEY_HEADER;

/// Registers the `x-api-key` header scheme referenced by protected paths.
struct ApiKeySecurityAddon;

impl Modify for ApiKeySecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "ApiKeyAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                API_KEY_HEADER,
                "Shared secret configured on the server. Send it as `x-api-key: YOUR_API_KEY`.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health,
        api::handlers::extract::extract_text,
    ),
    components(schemas(
        api::models::extract::ExtractResponse,
        api::models::extract::ErrorResponse,
    )),
    modifiers(&ApiKeySecurityAddon),
    tags(
        (name = "health", description = "Service liveness"),
        (name = "extraction", description = "Plain-text extraction from PDF and DOCX uploads"),
    ),
    info(
        title = "Text Extractor API",
        description = "Upload a PDF or Word document and get its text back as JSON.",
    )
)]
pub struct ApiDoc;
