//! HTTP request handlers for all API endpoints.
//!
//! # Handler Modules
//!
//! - [`extract`]: Document upload and text extraction
//! - [`health`]: Liveness check
//!
//! # Authentication
//!
//! `/extract` sits behind [`crate::auth::middleware::require_api_key`], so the handler only runs
//! for requests carrying the configured key. The health check is public.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the matching HTTP status code and a
//! JSON `{"error": ...}` body.

pub mod extract;
pub mod health;
