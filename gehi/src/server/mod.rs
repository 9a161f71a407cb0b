//! HTTP surface of the imagery service.
//!
//! - `handlers` turn run results into HTTP responses.
//! - `routes` mounts the handlers on an Axum `Router`.
//! - `cors` builds a `CorsLayer` from configured origin patterns.
//! - `imagery_server` owns the lifecycle: binding, middleware, graceful shutdown.

mod cors;
mod handlers;
mod imagery_server;
mod routes;

pub use handlers::{INVALID_LOCATION_MESSAGE, MISSING_BODY_MESSAGE, NO_OUTPUT_MESSAGE};
pub use imagery_server::ImageryServer;
