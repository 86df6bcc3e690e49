//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Response bodies
//!
//! # API Structure
//!
//! - `GET /`: liveness string
//! - `POST /extract`: multipart upload, guarded by the `x-api-key` header
//!
//! All endpoints are documented with `utoipa`; the document is served at
//! `/api-docs/openapi.json` and rendered at `/docs`.

pub mod handlers;
pub mod models;
