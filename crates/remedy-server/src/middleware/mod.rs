//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - API key checks for the webhook and the internal API
//! - Observability (tracing, request IDs)
//! - Error handling (panics, timeouts, service errors)
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use axum::Router;
//! use remedy_server::middleware::RouterExt;
//!
//! let app: Router = Router::new()
//!     .with_error_handling_layer(Duration::from_secs(30))
//!     .with_observability_layer();
//! ```

mod api_key;
mod error_handling;
mod extensions;
mod observability;

pub use api_key::{require_internal_key, require_webhook_key};
pub use extensions::RouterExt;

/// Tracing target for rejected API keys.
pub const TRACING_TARGET_AUTH: &str = "remedy_server::middleware::auth";

/// Tracing target for middleware-level failures.
pub const TRACING_TARGET_ERROR: &str = "remedy_server::middleware::error";
