//! API response data models.
//!
//! - [`extract`]: extraction result and the shared error body

pub mod extract;
