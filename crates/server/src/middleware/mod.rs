//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (fills `request_id`, echoes `x-request-id`)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireAuth`] and [`OptionalAuth`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{OptionalAuth, RequireAuth};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
