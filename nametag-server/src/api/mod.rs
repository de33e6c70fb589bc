//! HTTP routes
//!
//! - [`health`] - liveness check
//! - [`labels`] - render and print
//! - [`printer`] - connection status, connect and scan

pub mod health;
pub mod labels;
pub mod printer;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Router with every route registered, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(labels::router())
        .merge(printer::router())
}

/// Router with middleware, ready for `with_state`
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - the label page may be served from elsewhere
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
