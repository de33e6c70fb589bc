//! Printer connection routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/printer/status | GET | saved connection, revalidated |
//! | /api/printer/connect | POST | probe and save a connection |
//! | /api/printer/scan/system | POST | printers known to the print service |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::{ConnectPayload, ScanResponse};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/printer/status", get(handler::status))
        .route("/api/printer/connect", post(handler::connect))
        .route("/api/printer/scan/system", post(handler::scan_system))
}
