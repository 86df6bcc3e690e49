/// Body returned by the liveness check.
pub const HEALTH_MESSAGE: &str = "Text extractor running";

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    summary = "Liveness check",
    description = "Returns a fixed plain-text message. Requires no authentication.",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain"),
    )
)]
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}
