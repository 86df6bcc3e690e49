//! # text-extractor: plain text from PDF and Word uploads
//!
//! A small HTTP service. Clients upload a single document to `POST /extract` with a shared API
//! key; the service parses it in memory and answers with the normalized text as JSON.
//!
//! ## Architecture
//!
//! - **[`api`]**: Axum handlers and response models
//! - **[`auth`]**: `x-api-key` check, applied as route middleware
//! - **[`extraction`]**: Format detection, the PDF and DOCX backends, and whitespace normalization
//! - **[`config`]**: YAML + environment configuration via figment
//! - **[`errors`]**: The error type every handler returns, mapped to status codes and JSON bodies
//! - **[`telemetry`]**: tracing subscriber with optional OTLP export
//! - **[`openapi`]**: Generated OpenAPI document
//!
//! ## Request Flow
//!
//! 1. The API key middleware rejects requests without the configured key, before the body is read
//! 2. The handler streams the multipart body, keeping the single `file` part and enforcing the
//!    size limit
//! 3. The declared content type (or filename extension) picks the DOCX or PDF backend
//! 4. The backend runs on the blocking pool and the text is normalized
//! 5. The response reports filename, character count and text
//!
//! Nothing is written to disk and no state survives a request.
//!
//! ## Running
//!
//! ```bash
//! API_KEY=secret text-extractor
//! curl -H 'x-api-key: secret' -F file=@report.pdf http://localhost:3000/extract
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use text_extractor::{Application, Config, telemetry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.ok();
//!     })
//!     .await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod openapi;
pub mod telemetry;
#[cfg(test)]
mod test_utils;

use anyhow::Context;
use auth::middleware::require_api_key;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use extraction::Extractors;
use openapi::ApiDoc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Room left on top of the file limit for multipart boundaries, part headers and small fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .extractors(Extractors::default())
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    #[builder(default)]
    pub extractors: Extractors,
}

/// Build the application router with all endpoints and middleware.
///
/// - `GET /`: health check, public
/// - `POST /extract`: API key middleware, body limit derived from `limits.max_file_size`
/// - `GET /api-docs/openapi.json` and `GET /docs`: API documentation
/// - `GET /internal/metrics`: Prometheus metrics, only with `enable_metrics`
///
/// # Errors
///
/// Returns an error if the configured file size limit does not fit in `usize`.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let file_limit = usize::try_from(state.config.limits.max_file_size).context("limits.max_file_size is too large for this platform")?;
    let body_limit = file_limit.saturating_add(MULTIPART_OVERHEAD);

    // The key check is a route layer so unmatched paths still 404 instead of 401
    let extract_routes = Router::new()
        .route(
            "/extract",
            post(api::handlers::extract::extract_text).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    let mut router = Router::new()
        .route("/", get(api::handlers::health::health))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(extract_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The HTTP service: a router bound to its configuration.
///
/// 1. **Create**: [`Application::new`] picks the extraction backends and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish and telemetry is
///    flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create an application using the PDF and DOCX backends.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_extractors(config, Extractors::default())
    }

    /// Create an application with the given extraction backends.
    pub fn with_extractors(config: Config, extractors: Extractors) -> anyhow::Result<Self> {
        // Config holds the API key, so only log the non-secret parts
        info!(
            host = %config.host,
            port = config.port,
            max_file_size = config.limits.max_file_size,
            enable_metrics = config.enable_metrics,
            "Starting text extractor"
        );
        if config.configured_api_key().is_none() {
            warn!("No api_key configured: every /extract request will be rejected as unauthorized");
        }

        let state = AppState::builder().config(config.clone()).extractors(extractors).build();
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind to {bind_addr}"))?;
        info!(
            "Text extractor listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
