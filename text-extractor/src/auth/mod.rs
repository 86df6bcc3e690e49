//! Shared-secret authentication.
//!
//! The service has a single credential: the `api_key` from configuration. Clients send it in the
//! `x-api-key` header and the value must match exactly. There are no users, sessions or scopes.
//!
//! When no key is configured (or it is empty) nothing can match, so every protected request is
//! rejected with `401`. The service still starts and the health check keeps answering.
//!
//! # Modules
//!
//! - [`middleware`]: Route protection middleware
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn_with_state, routing::post};
//! use text_extractor::auth::middleware::require_api_key;
//!
//! let router = Router::new()
//!     .route("/extract", post(extract_text))
//!     .route_layer(from_fn_with_state(state.clone(), require_api_key));
//! ```

pub mod middleware;
